use crate::container::SignatureContent;
use crate::hashing::{FileReference, MultiHashElement};
use crate::policy::VerificationConfig;
use crate::rules::hash_trust::{check_integrity, verify_reference, ReferenceVerdict};
use crate::rules::{predecessor_passed, Check, RuleContext, RuleName, RuleOutcome};
use crate::verification::{ResultHolder, RuleState};
use serde::{Deserialize, Serialize};

/// How much of an annotation may be stripped without invalidating the unit.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemovabilityClass {
    NON_REMOVABLE,
    VALUE_REMOVABLE,
    FULLY_REMOVABLE,
}

impl RemovabilityClass {
    /// Reads the `removable` parameter of a MIME type:
    /// `removable=full`, `removable=value`, anything else is non-removable.
    pub fn from_content_type(content_type: &str) -> Self {
        for param in content_type.split(';').skip(1) {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            if !key.trim().eq_ignore_ascii_case("removable") {
                continue;
            }
            let value = value.trim().trim_matches('"');
            if value.eq_ignore_ascii_case("full") {
                return RemovabilityClass::FULLY_REMOVABLE;
            }
            if value.eq_ignore_ascii_case("value") {
                return RemovabilityClass::VALUE_REMOVABLE;
            }
        }
        RemovabilityClass::NON_REMOVABLE
    }

    /// Effective state for checks on the Single-Annotation-Manifest itself.
    pub fn manifest_state(&self, configured: RuleState) -> RuleState {
        match self {
            RemovabilityClass::FULLY_REMOVABLE => RuleState::IGNORE,
            _ => configured,
        }
    }

    /// Effective state for checks on the annotation data.
    pub fn data_state(&self, configured: RuleState) -> RuleState {
        match self {
            RemovabilityClass::NON_REMOVABLE => configured,
            _ => RuleState::IGNORE,
        }
    }
}

pub struct AnnotationManifestExistsRule {
    check: Check,
}

impl AnnotationManifestExistsRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::AnnotationManifestExists, config),
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
        let class = RemovabilityClass::from_content_type(reference.content_type());
        let check = self.check.with_state(class.manifest_state(self.check.state));
        let path = reference.uri();
        if unit.annotation_manifests.contains_key(path) {
            check.pass(ctx, holder, path);
            Ok(())
        } else {
            check.fail(ctx, holder, path, "annotation manifest missing", None)
        }
    }
}

/// Hash trust plus the Documents-Manifest back-reference cross-check.
pub struct AnnotationManifestIntegrityRule {
    check: Check,
}

impl AnnotationManifestIntegrityRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::AnnotationManifestIntegrity, config),
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
        let class = RemovabilityClass::from_content_type(reference.content_type());
        let check = self.check.with_state(class.manifest_state(self.check.state));
        let path = reference.uri();
        if !predecessor_passed(ctx, holder, RuleName::AnnotationManifestExists, path) {
            return Ok(());
        }
        let (Some(sam), Some(manifest)) = (unit.annotation_manifests.get(path), &unit.manifest)
        else {
            return Ok(());
        };
        if let ReferenceVerdict::Failed { primitive, message } =
            verify_reference(ctx, holder, check.state, sam, reference)
        {
            return check.fail(
                ctx,
                holder,
                path,
                format!("{} failed: {}", primitive, message),
                None,
            );
        }
        if sam.documents_manifest != manifest.documents_manifest {
            return check.fail(
                ctx,
                holder,
                path,
                format!(
                    "documents manifest back-reference {} differs from the manifest's {}",
                    sam.documents_manifest.uri(),
                    manifest.documents_manifest.uri()
                ),
                None,
            );
        }
        check.pass(ctx, holder, path);
        Ok(())
    }
}

pub struct AnnotationExistsRule {
    check: Check,
}

impl AnnotationExistsRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::AnnotationExists, config),
        }
    }

    /// `reference` points at the Single-Annotation-Manifest owning the data.
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
        if !predecessor_passed(ctx, holder, RuleName::AnnotationManifestIntegrity, reference.uri()) {
            return Ok(());
        }
        let Some(sam) = unit.annotation_manifests.get(reference.uri()) else {
            return Ok(());
        };
        let data = &sam.annotation;
        let class = RemovabilityClass::from_content_type(data.content_type());
        let check = self.check.with_state(class.data_state(self.check.state));
        if unit.annotations.contains_key(data.uri()) {
            check.pass(ctx, holder, data.uri());
            Ok(())
        } else {
            check.fail(ctx, holder, data.uri(), "annotation data missing", None)
        }
    }
}

pub struct AnnotationIntegrityRule {
    check: Check,
}

impl AnnotationIntegrityRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::AnnotationIntegrity, config),
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
        // A rejected manifest says nothing trustworthy about its data.
        if !predecessor_passed(ctx, holder, RuleName::AnnotationManifestIntegrity, reference.uri()) {
            return Ok(());
        }
        let Some(sam) = unit.annotation_manifests.get(reference.uri()) else {
            return Ok(());
        };
        let data = &sam.annotation;
        let class = RemovabilityClass::from_content_type(data.content_type());
        let check = self.check.with_state(class.data_state(self.check.state));
        check_integrity(
            &check,
            RuleName::AnnotationExists,
            unit.annotations
                .get(data.uri())
                .map(|a| a as &dyn MultiHashElement),
            data,
            ctx,
            holder,
        )
    }
}

/// Every Single-Annotation-Manifest listed by the Annotations-Manifest, each
/// in its own branch.
pub struct AnnotationEntriesRule {
    manifest_exists: AnnotationManifestExistsRule,
    manifest_integrity: AnnotationManifestIntegrityRule,
    data_exists: AnnotationExistsRule,
    data_integrity: AnnotationIntegrityRule,
}

impl AnnotationEntriesRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            manifest_exists: AnnotationManifestExistsRule::new(config),
            manifest_integrity: AnnotationManifestIntegrityRule::new(config),
            data_exists: AnnotationExistsRule::new(config),
            data_integrity: AnnotationIntegrityRule::new(config),
        }
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        let Some(am) = unit.referenced_annotations_manifest() else {
            return Ok(());
        };
        for reference in &am.annotation_manifests {
            if let Err(t) = self.verify_entry(unit, reference, ctx, holder) {
                tracing::debug!(rule = t.rule.as_str(), path = %t.tested_path, "annotation branch pruned");
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
        self.manifest_exists.verify(unit, reference, ctx, holder)?;
        self.manifest_integrity.verify(unit, reference, ctx, holder)?;
        self.data_exists.verify(unit, reference, ctx, holder)?;
        self.data_integrity.verify(unit, reference, ctx, holder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removability_is_read_from_content_type_parameter() {
        assert_eq!(
            RemovabilityClass::from_content_type("application/json; removable=full"),
            RemovabilityClass::FULLY_REMOVABLE
        );
        assert_eq!(
            RemovabilityClass::from_content_type("text/plain;charset=utf-8; Removable=\"VALUE\""),
            RemovabilityClass::VALUE_REMOVABLE
        );
        assert_eq!(
            RemovabilityClass::from_content_type("application/json"),
            RemovabilityClass::NON_REMOVABLE
        );
        assert_eq!(
            RemovabilityClass::from_content_type("application/json; removable=maybe"),
            RemovabilityClass::NON_REMOVABLE
        );
    }

    #[test]
    fn effective_states_follow_the_removability_table() {
        let c = RuleState::FAIL;
        assert_eq!(RemovabilityClass::NON_REMOVABLE.manifest_state(c), RuleState::FAIL);
        assert_eq!(RemovabilityClass::NON_REMOVABLE.data_state(c), RuleState::FAIL);
        assert_eq!(RemovabilityClass::VALUE_REMOVABLE.manifest_state(c), RuleState::FAIL);
        assert_eq!(RemovabilityClass::VALUE_REMOVABLE.data_state(c), RuleState::IGNORE);
        assert_eq!(RemovabilityClass::FULLY_REMOVABLE.manifest_state(c), RuleState::IGNORE);
        assert_eq!(RemovabilityClass::FULLY_REMOVABLE.data_state(c), RuleState::IGNORE);
    }
}
