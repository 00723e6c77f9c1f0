//! Verification rules.
//!
//! Every leaf rule records zero or more results into the [`ResultHolder`] and
//! returns a [`RuleOutcome`]. `Err(Termination)` prunes the rest of the
//! enclosing branch; composite rules absorb it so siblings keep verifying.

pub mod annotation;
pub mod composite;
pub mod container;
pub mod document;
pub mod hash_trust;
pub mod manifest;
pub mod signature;

use crate::error::CoreError;
use crate::hashing::HashAlgorithmRegistry;
use crate::policy::VerificationConfig;
use crate::signature::SignatureVerifier;
use crate::verification::{ResultHolder, RuleState, Scope, VerificationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use composite::{CompositeRule, UnitRule};
pub use container::ContainerRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RuleName {
    ContainerMimeType,
    ContainerUnknownFiles,
    ManifestExists,
    SignatureExists,
    SignatureIntegrity,
    SignatureSignsManifest,
    DocumentsManifestExists,
    DocumentsManifestIntegrity,
    AnnotationsManifestExists,
    AnnotationsManifestIntegrity,
    AnnotationManifestExists,
    AnnotationManifestIntegrity,
    AnnotationExists,
    AnnotationIntegrity,
    DocumentExists,
    DocumentIntegrity,
    HashAlgorithmImplemented,
    HashAlgorithmTrusted,
    HashDigestMatch,
}

impl RuleName {
    pub const ALL: [RuleName; 19] = [
        RuleName::ContainerMimeType,
        RuleName::ContainerUnknownFiles,
        RuleName::ManifestExists,
        RuleName::SignatureExists,
        RuleName::SignatureIntegrity,
        RuleName::SignatureSignsManifest,
        RuleName::DocumentsManifestExists,
        RuleName::DocumentsManifestIntegrity,
        RuleName::AnnotationsManifestExists,
        RuleName::AnnotationsManifestIntegrity,
        RuleName::AnnotationManifestExists,
        RuleName::AnnotationManifestIntegrity,
        RuleName::AnnotationExists,
        RuleName::AnnotationIntegrity,
        RuleName::DocumentExists,
        RuleName::DocumentIntegrity,
        RuleName::HashAlgorithmImplemented,
        RuleName::HashAlgorithmTrusted,
        RuleName::HashDigestMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::ContainerMimeType => "CHK.CONTAINER.MIME_TYPE",
            RuleName::ContainerUnknownFiles => "CHK.CONTAINER.UNKNOWN_FILES",
            RuleName::ManifestExists => "CHK.MANIFEST.EXISTS",
            RuleName::SignatureExists => "CHK.SIGNATURE.EXISTS",
            RuleName::SignatureIntegrity => "CHK.SIGNATURE.INTEGRITY",
            RuleName::SignatureSignsManifest => "CHK.SIGNATURE.SIGNS_MANIFEST",
            RuleName::DocumentsManifestExists => "CHK.DOCUMENTS_MANIFEST.EXISTS",
            RuleName::DocumentsManifestIntegrity => "CHK.DOCUMENTS_MANIFEST.INTEGRITY",
            RuleName::AnnotationsManifestExists => "CHK.ANNOTATIONS_MANIFEST.EXISTS",
            RuleName::AnnotationsManifestIntegrity => "CHK.ANNOTATIONS_MANIFEST.INTEGRITY",
            RuleName::AnnotationManifestExists => "CHK.ANNOTATION_MANIFEST.EXISTS",
            RuleName::AnnotationManifestIntegrity => "CHK.ANNOTATION_MANIFEST.INTEGRITY",
            RuleName::AnnotationExists => "CHK.ANNOTATION.EXISTS",
            RuleName::AnnotationIntegrity => "CHK.ANNOTATION.INTEGRITY",
            RuleName::DocumentExists => "CHK.DOCUMENT.EXISTS",
            RuleName::DocumentIntegrity => "CHK.DOCUMENT.INTEGRITY",
            RuleName::HashAlgorithmImplemented => "CHK.HASH.ALGORITHM_IMPLEMENTED",
            RuleName::HashAlgorithmTrusted => "CHK.HASH.ALGORITHM_TRUSTED",
            RuleName::HashDigestMatch => "CHK.HASH.DIGEST_MATCH",
        }
    }

    /// Structural prerequisites: a hard failure prunes the enclosing branch.
    pub fn is_terminating(&self) -> bool {
        !matches!(self, RuleName::ContainerUnknownFiles)
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleName::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown rule {}", s)))
    }
}

impl From<RuleName> for String {
    fn from(r: RuleName) -> Self {
        r.as_str().to_string()
    }
}

impl TryFrom<String> for RuleName {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Signal that a structural check failed and the branch must stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    pub rule: RuleName,
    pub tested_path: String,
}

pub type RuleOutcome = Result<(), Termination>;

/// Capabilities shared by the rules of one scope.
pub struct RuleContext<'a> {
    pub scope: Scope,
    pub registry: &'a dyn HashAlgorithmRegistry,
    pub signatures: &'a dyn SignatureVerifier,
}

/// A rule name bound to the severity it records failures with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub name: RuleName,
    pub state: RuleState,
}

impl Check {
    /// Resolves the configured state once.
    pub fn configured(name: RuleName, config: &VerificationConfig) -> Self {
        Self {
            name,
            state: config.rule_state(name),
        }
    }

    pub fn with_state(self, state: RuleState) -> Self {
        Self { state, ..self }
    }

    /// Configured `IGNORE`: the rule does not run at all.
    pub fn skipped(&self) -> bool {
        self.state.is_ignored()
    }

    /// Passing evidence is recorded whatever the state.
    pub fn pass(&self, ctx: &RuleContext<'_>, holder: &mut ResultHolder, path: &str) {
        holder.add_result(&ctx.scope, VerificationResult::ok(self.name, path));
    }

    /// Records a failure per the state and terminates on a hard failure of a
    /// structural rule. Under `IGNORE` nothing is recorded.
    pub fn fail(
        &self,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
        path: &str,
        message: impl Into<String>,
        cause: Option<&CoreError>,
    ) -> RuleOutcome {
        let Some(outcome) = self.state.failure_outcome() else {
            tracing::debug!(rule = self.name.as_str(), path, "failure dropped");
            return Ok(());
        };
        let mut result = VerificationResult::failed(self.name, path, outcome, message);
        if let Some(e) = cause {
            result = result.with_cause(e);
        }
        holder.add_result(&ctx.scope, result);
        if self.state == RuleState::FAIL && self.name.is_terminating() {
            tracing::debug!(rule = self.name.as_str(), path, "branch terminated");
            return Err(Termination {
                rule: self.name,
                tested_path: path.to_string(),
            });
        }
        Ok(())
    }
}

/// Gate on the most recent result of `predecessor` for `path`. No result
/// (predecessor ignored) counts as no objection.
pub fn predecessor_passed(
    ctx: &RuleContext<'_>,
    holder: &ResultHolder,
    predecessor: RuleName,
    path: &str,
) -> bool {
    holder
        .filtered_aggregated_result(&ctx.scope, |r| r.is_for(predecessor, path), Some(1))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_names_round_trip_through_strings() {
        for r in RuleName::ALL {
            assert_eq!(r.as_str().parse::<RuleName>().unwrap(), r);
        }
        assert!("CHK.NOPE".parse::<RuleName>().is_err());
        let json = serde_json::to_string(&RuleName::DocumentIntegrity).unwrap();
        assert_eq!(json, "\"CHK.DOCUMENT.INTEGRITY\"");
    }
}
