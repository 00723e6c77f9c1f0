use crate::container::SignatureContent;
use crate::error::CoreError;
use crate::hashing::{HashAlgorithm, MultiHashElement};
use crate::policy::VerificationConfig;
use crate::rules::{predecessor_passed, Check, RuleContext, RuleName, RuleOutcome};
use crate::verification::{Outcome, ResultHolder, VerificationResult};

fn signature_path(unit: &SignatureContent) -> &str {
    match (&unit.signature, &unit.manifest) {
        (Some(s), _) => &s.uri,
        (None, Some(m)) => &m.signature_uri,
        (None, None) => &unit.id,
    }
}

pub struct SignatureExistsRule {
    check: Check,
}

impl SignatureExistsRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::SignatureExists, config),
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
        let path = signature_path(unit);
        let Some(sig) = &unit.signature else {
            return self.check.fail(ctx, holder, path, "signature missing", None);
        };
        if sig.bytes.is_none() {
            return self
                .check
                .fail(ctx, holder, path, "signature carries no signature bytes", None);
        }
        if let Some(m) = &unit.manifest {
            if m.signature_uri != sig.uri {
                return self.check.fail(
                    ctx,
                    holder,
                    path,
                    format!("manifest expects signature at {}", m.signature_uri),
                    None,
                );
            }
        }
        self.check.pass(ctx, holder, path);
        Ok(())
    }
}

/// Delegates to the injected signature capability.
pub struct SignatureIntegrityRule {
    check: Check,
}

impl SignatureIntegrityRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::SignatureIntegrity, config),
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
        let path = signature_path(unit);
        if !predecessor_passed(ctx, holder, RuleName::SignatureExists, path) {
            return Ok(());
        }
        let (Some(sig), Some(manifest)) = (&unit.signature, &unit.manifest) else {
            return Ok(());
        };
        let Some(bytes) = &sig.bytes else {
            return Ok(());
        };
        if !ctx.signatures.is_supported(sig) {
            return self.check.fail(
                ctx,
                holder,
                path,
                format!("unsupported signature type {}", sig.signature_type),
                None,
            );
        }
        let outcome = match ctx.signatures.verify(bytes, manifest) {
            Ok(o) => o,
            Err(e) => {
                return self
                    .check
                    .fail(ctx, holder, path, "signature could not be verified", Some(&e))
            }
        };
        let simplified = outcome.simplified;
        holder.add_signature_result(&ctx.scope, outcome);
        match simplified {
            Outcome::OK => {
                self.check.pass(ctx, holder, path);
                Ok(())
            }
            Outcome::WARN => {
                holder.add_result(
                    &ctx.scope,
                    VerificationResult::failed(
                        self.check.name,
                        path,
                        Outcome::WARN,
                        "signature verified with warnings",
                    ),
                );
                Ok(())
            }
            Outcome::NOK => self.check.fail(ctx, holder, path, "signature is invalid", None),
        }
    }
}

/// The signature's signed hash must equal the root manifest's digest.
pub struct SignsManifestRule {
    check: Check,
}

impl SignsManifestRule {
    pub fn new(config: &VerificationConfig) -> Self {
        Self {
            check: Check::configured(RuleName::SignatureSignsManifest, config),
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
        let path = signature_path(unit);
        if !predecessor_passed(ctx, holder, RuleName::SignatureExists, path) {
            return Ok(());
        }
        let (Some(sig), Some(manifest)) = (&unit.signature, &unit.manifest) else {
            return Ok(());
        };
        let Some(signed) = &sig.signed_hash else {
            return self
                .check
                .fail(ctx, holder, path, "signature carries no signed hash", None);
        };
        let Some(alg) = HashAlgorithm::from_id(&signed.algorithm) else {
            let e = CoreError::UnsupportedAlgorithm(signed.algorithm.clone());
            return self.check.fail(
                ctx,
                holder,
                path,
                "cannot recompute manifest digest",
                Some(&e),
            );
        };
        match manifest.data_hash(alg) {
            Ok(d) if d.eq_ignore_ascii_case(signed.digest.trim()) => {
                self.check.pass(ctx, holder, path);
                Ok(())
            }
            Ok(_) => self.check.fail(
                ctx,
                holder,
                path,
                format!("signed {} hash does not match {}", alg.id(), manifest.uri),
                None,
            ),
            Err(e) => self.check.fail(
                ctx,
                holder,
                path,
                format!("failed to compute digest of {}", manifest.uri),
                Some(&e),
            ),
        }
    }
}
