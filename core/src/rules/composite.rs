use crate::container::SignatureContent;
use crate::policy::VerificationConfig;
use crate::rules::annotation::AnnotationEntriesRule;
use crate::rules::document::DocumentEntriesRule;
use crate::rules::manifest::{
    AnnotationsManifestExistsRule, AnnotationsManifestIntegrityRule, DocumentsManifestExistsRule,
    DocumentsManifestIntegrityRule, ManifestExistsRule,
};
use crate::rules::signature::{SignatureExistsRule, SignatureIntegrityRule, SignsManifestRule};
use crate::rules::{RuleContext, RuleOutcome};
use crate::verification::ResultHolder;

/// Closed set of rules applied to one signature-content unit.
pub enum UnitRule {
    ManifestExists(ManifestExistsRule),
    SignatureExists(SignatureExistsRule),
    SignatureIntegrity(SignatureIntegrityRule),
    SignsManifest(SignsManifestRule),
    DocumentsManifestExists(DocumentsManifestExistsRule),
    DocumentsManifestIntegrity(DocumentsManifestIntegrityRule),
    AnnotationsManifestExists(AnnotationsManifestExistsRule),
    AnnotationsManifestIntegrity(AnnotationsManifestIntegrityRule),
    Documents(DocumentEntriesRule),
    Annotations(AnnotationEntriesRule),
    Composite(CompositeRule),
}

impl UnitRule {
    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        match self {
            UnitRule::ManifestExists(r) => r.verify(unit, ctx, holder),
            UnitRule::SignatureExists(r) => r.verify(unit, ctx, holder),
            UnitRule::SignatureIntegrity(r) => r.verify(unit, ctx, holder),
            UnitRule::SignsManifest(r) => r.verify(unit, ctx, holder),
            UnitRule::DocumentsManifestExists(r) => r.verify(unit, ctx, holder),
            UnitRule::DocumentsManifestIntegrity(r) => r.verify(unit, ctx, holder),
            UnitRule::AnnotationsManifestExists(r) => r.verify(unit, ctx, holder),
            UnitRule::AnnotationsManifestIntegrity(r) => r.verify(unit, ctx, holder),
            UnitRule::Documents(r) => r.verify(unit, ctx, holder),
            UnitRule::Annotations(r) => r.verify(unit, ctx, holder),
            UnitRule::Composite(r) => r.verify(unit, ctx, holder),
        }
    }
}

/// Ordered children forming one branch. A termination raised by a child
/// stops the remaining children and goes no further.
pub struct CompositeRule {
    label: &'static str,
    children: Vec<UnitRule>,
}

impl CompositeRule {
    pub fn new(label: &'static str, children: Vec<UnitRule>) -> Self {
        Self { label, children }
    }

    /// Full per-unit rule tree.
    pub fn standard_unit(config: &VerificationConfig) -> Self {
        let documents = CompositeRule::new(
            "documents",
            vec![
                UnitRule::DocumentsManifestExists(DocumentsManifestExistsRule::new(config)),
                UnitRule::DocumentsManifestIntegrity(DocumentsManifestIntegrityRule::new(config)),
                UnitRule::Documents(DocumentEntriesRule::new(config)),
            ],
        );
        let annotations = CompositeRule::new(
            "annotations",
            vec![
                UnitRule::AnnotationsManifestExists(AnnotationsManifestExistsRule::new(config)),
                UnitRule::AnnotationsManifestIntegrity(AnnotationsManifestIntegrityRule::new(
                    config,
                )),
                UnitRule::Annotations(AnnotationEntriesRule::new(config)),
            ],
        );
        CompositeRule::new(
            "unit",
            vec![
                UnitRule::ManifestExists(ManifestExistsRule::new(config)),
                UnitRule::SignatureExists(SignatureExistsRule::new(config)),
                UnitRule::SignatureIntegrity(SignatureIntegrityRule::new(config)),
                UnitRule::SignsManifest(SignsManifestRule::new(config)),
                UnitRule::Composite(documents),
                UnitRule::Composite(annotations),
            ],
        )
    }

    pub fn verify(
        &self,
        unit: &SignatureContent,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        for child in &self.children {
            if let Err(t) = child.verify(unit, ctx, holder) {
                tracing::debug!(
                    branch = self.label,
                    unit = %unit.id,
                    rule = t.rule.as_str(),
                    path = %t.tested_path,
                    "branch terminated"
                );
                break;
            }
        }
        Ok(())
    }
}
