use crate::container::SignatureContent;
use crate::hashing::{FileReference, MultiHashElement};
use crate::policy::VerificationConfig;
use crate::rules::hash_trust::check_integrity;
use crate::rules::{Check, RuleContext, RuleName, RuleOutcome};
use crate::verification::ResultHolder;

pub struct DocumentExistsRule {
    check: Check,
}

impl DocumentExistsRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::DocumentExists, config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        reference: &FileReference,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        if self.check.skipped() {
            return Ok(());
        }
        let path = reference.uri();
        if unit.documents.contains_key(path) {
            self.check.pass(ctx, holder, path);
            Ok(())
        } else {
            self.check.fail(ctx, holder, path, "document missing", None)
        }
    }
}

pub struct DocumentIntegrityRule {
    check: Check,
}

impl DocumentIntegrityRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::DocumentIntegrity, config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        reference: &FileReference,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        if self.check.skipped() {
            return Ok(());
        }
        check_integrity(
            &self.check,
            RuleName::DocumentExists,
            unit.documents
                .get(reference.uri())
                .map(|d| d as &dyn MultiHashElement),
            reference,
            ctx,
            holder,
        )
    }
}

/// Every document listed by the Documents-Manifest, each in its own branch.
pub struct DocumentEntriesRule {
    exists: DocumentExistsRule,
    integrity: DocumentIntegrityRule,
}

impl DocumentEntriesRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            exists: DocumentExistsRule::new(config),
            integrity: DocumentIntegrityRule::new(config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        let Some(dm) = unit.referenced_documents_manifest() else {
            return Ok(());
        };
        for reference in &dm.documents {
            if let Err(t) = self.verify_entry(unit, reference, ctx, holder) {
                tracing::debug!(rule = t.rule.as_str(), path = %t.tested_path, "document branch pruned");
            }
        }
        Ok(())
    }

    fn verify_entry(
        &self,
        unit: &SignatureContent,
        reference: &FileReference,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        self.exists.verify(unit, reference, ctx, holder)?;
        self.integrity.verify(unit, reference, ctx, holder)
    }
}
