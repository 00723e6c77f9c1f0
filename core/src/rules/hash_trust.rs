//! Hash-trust primitives applied to an (element, reference) pair, always in
//! the order: algorithm implemented → algorithm trusted → digest match.

use crate::error::CoreError;
use crate::hashing::{AlgorithmStatus, FileReference, HashAlgorithm, MultiHashElement};
use crate::rules::{predecessor_passed, Check, RuleContext, RuleName, RuleOutcome};
use crate::verification::{ResultHolder, RuleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashTrustPrimitive {
    AlgorithmImplemented,
    AlgorithmTrusted,
    DigestMatch,
}

struct PrimitiveFailure {
    message: String,
    cause: Option<CoreError>,
}

impl PrimitiveFailure {
    fn new(message: String) -> Self {
        Self {
            message,
            cause: None,
        }
    }
}

impl HashTrustPrimitive {
    pub const ORDER: [HashTrustPrimitive; 3] = [
        HashTrustPrimitive::AlgorithmImplemented,
        HashTrustPrimitive::AlgorithmTrusted,
        HashTrustPrimitive::DigestMatch,
    ];

    pub fn rule_name(&self) -> RuleName {
        match self {
            HashTrustPrimitive::AlgorithmImplemented => RuleName::HashAlgorithmImplemented,
            HashTrustPrimitive::AlgorithmTrusted => RuleName::HashAlgorithmTrusted,
            HashTrustPrimitive::DigestMatch => RuleName::HashDigestMatch,
        }
    }

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        element: &dyn MultiHashElement,
        reference: &FileReference,
    ) -> Result<(), PrimitiveFailure> {
        match self {
            HashTrustPrimitive::AlgorithmImplemented => {
                let missing: Vec<&str> = reference
                    .hashes()
                    .iter()
                    .filter(|h| ctx.registry.status(&h.algorithm) == AlgorithmStatus::NOT_IMPLEMENTED)
                    .map(|h| h.algorithm.as_str())
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(PrimitiveFailure::new(format!(
                        "algorithm not implemented: {}",
                        missing.join(", ")
                    )))
                }
            }
            HashTrustPrimitive::AlgorithmTrusted => {
                let any_trusted = reference
                    .hashes()
                    .iter()
                    .any(|h| ctx.registry.status(&h.algorithm) == AlgorithmStatus::NORMAL);
                if any_trusted {
                    Ok(())
                } else {
                    let listed: Vec<&str> =
                        reference.hashes().iter().map(|h| h.algorithm.as_str()).collect();
                    Err(PrimitiveFailure::new(format!(
                        "no trusted algorithm among: {}",
                        listed.join(", ")
                    )))
                }
            }
            HashTrustPrimitive::DigestMatch => {
                // Every listed pair must match; one bad pair fails the reference.
                for h in reference.hashes() {
                    let Some(alg) = HashAlgorithm::from_id(&h.algorithm) else {
                        return Err(PrimitiveFailure {
                            message: format!("cannot compute {} digest", h.algorithm),
                            cause: Some(CoreError::UnsupportedAlgorithm(h.algorithm.clone())),
                        });
                    };
                    let computed = match element.data_hash(alg) {
                        Ok(d) => d,
                        Err(e) => {
                            return Err(PrimitiveFailure {
                                message: format!(
                                    "failed to compute {} digest of {}",
                                    alg.id(),
                                    element.element_path()
                                ),
                                cause: Some(e),
                            })
                        }
                    };
                    if !computed.eq_ignore_ascii_case(h.digest.trim()) {
                        return Err(PrimitiveFailure::new(format!(
                            "{} digest mismatch for {}",
                            alg.id(),
                            element.element_path()
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceVerdict {
    Trusted,
    Failed { primitive: RuleName, message: String },
}

/// Runs the three primitives under the caller's effective `state`, each
/// recording its own result. The first failure ends the chain whatever the
/// state, so later primitives never run on a rejected reference.
pub fn verify_reference(
    ctx: &RuleContext<'_>,
    holder: &mut ResultHolder,
    state: RuleState,
    element: &dyn MultiHashElement,
    reference: &FileReference,
) -> ReferenceVerdict {
    let path = reference.uri();
    for primitive in HashTrustPrimitive::ORDER {
        let check = Check {
            name: primitive.rule_name(),
            state,
        };
        if let Err(failure) = primitive.evaluate(ctx, element, reference) {
            // Termination is reported by the calling integrity rule.
            let _ = check.fail(
                ctx,
                holder,
                path,
                failure.message.clone(),
                failure.cause.as_ref(),
            );
            return ReferenceVerdict::Failed {
                primitive: check.name,
                message: failure.message,
            };
        }
        check.pass(ctx, holder, path);
    }
    ReferenceVerdict::Trusted
}

/// Shared body of the integrity rules: gate on the existence rule, skip an
/// absent element, then require a trusted reference.
pub fn check_integrity(
    check: &Check,
    existence: RuleName,
    element: Option<&dyn MultiHashElement>,
    reference: &FileReference,
    ctx: &RuleContext<'_>,
    holder: &mut ResultHolder,
) -> RuleOutcome {
    let path = reference.uri();
    if !predecessor_passed(ctx, holder, existence, path) {
        return Ok(());
    }
    let Some(element) = element else {
        return Ok(());
    };
    match verify_reference(ctx, holder, check.state, element, reference) {
        ReferenceVerdict::Trusted => {
            check.pass(ctx, holder, path);
            Ok(())
        }
        ReferenceVerdict::Failed { primitive, message } => check.fail(
            ctx,
            holder,
            path,
            format!("{} failed: {}", primitive, message),
            None,
        ),
    }
}
