use crate::container::SignatureContent;
use crate::hashing::MultiHashElement;
use crate::policy::VerificationConfig;
use crate::rules::hash_trust::check_integrity;
use crate::rules::{Check, RuleContext, RuleName, RuleOutcome};
use crate::verification::ResultHolder;

pub struct ManifestExistsRule {
    check: Check,
}

impl ManifestExistsRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::ManifestExists, config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        if self.check.skipped() {
            return Ok(());
        }
        match &unit.manifest {
            Some(m) => {
                self.check.pass(ctx, holder, &m.uri);
                Ok(())
            }
            None => self
                .check
                .fail(ctx, holder, &unit.id, "manifest missing or unreadable", None),
        }
    }
}

pub struct DocumentsManifestExistsRule {
    check: Check,
}

impl DocumentsManifestExistsRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::DocumentsManifestExists, config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        if self.check.skipped() {
            return Ok(());
        }
        let Some(manifest) = &unit.manifest else {
            return Ok(());
        };
        let path = manifest.documents_manifest.uri();
        if unit.referenced_documents_manifest().is_some() {
            self.check.pass(ctx, holder, path);
            Ok(())
        } else {
            self.check
                .fail(ctx, holder, path, "documents manifest missing", None)
        }
    }
}

pub struct DocumentsManifestIntegrityRule {
    check: Check,
}

impl DocumentsManifestIntegrityRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::DocumentsManifestIntegrity, config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        if self.check.skipped() {
            return Ok(());
        }
        let Some(manifest) = &unit.manifest else {
            return Ok(());
        };
        check_integrity(
            &self.check,
            RuleName::DocumentsManifestExists,
            unit.referenced_documents_manifest()
                .map(|dm| dm as &dyn MultiHashElement),
            &manifest.documents_manifest,
            ctx,
            holder,
        )
    }
}

pub struct AnnotationsManifestExistsRule {
    check: Check,
}

impl AnnotationsManifestExistsRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::AnnotationsManifestExists, config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        if self.check.skipped() {
            return Ok(());
        }
        let Some(manifest) = &unit.manifest else {
            return Ok(());
        };
        let path = manifest.annotations_manifest.uri();
        if unit.referenced_annotations_manifest().is_some() {
            self.check.pass(ctx, holder, path);
            Ok(())
        } else {
            self.check
                .fail(ctx, holder, path, "annotations manifest missing", None)
        }
    }
}

pub struct AnnotationsManifestIntegrityRule {
    check: Check,
}

impl AnnotationsManifestIntegrityRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::AnnotationsManifestIntegrity, config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        if self.check.skipped() {
            return Ok(());
        }
        let Some(manifest) = &unit.manifest else {
            return Ok(());
        };
        check_integrity(
            &self.check,
            RuleName::AnnotationsManifestExists,
            unit.referenced_annotations_manifest()
                .map(|am| am as &dyn MultiHashElement),
            &manifest.annotations_manifest,
            ctx,
            holder,
        )
    }
}
