use crate::container::Container;
use crate::error::CoreResult;
use crate::hashing::{DefaultAlgorithmRegistry, HashAlgorithmRegistry};
use crate::policy::config::VerificationConfig;
use crate::policy::verdict::{ContainerVerdict, UnitVerdict};
use crate::rules::{CompositeRule, ContainerRule, RuleContext};
use crate::signature::SignatureVerifier;
use crate::verification::{aggregate, ResultHolder, Scope};

/// Rules composed once from the configuration.
pub struct RuleSet {
    pub container: Vec<ContainerRule>,
    pub unit: CompositeRule,
}

impl RuleSet {
    pub fn standard(config: &VerificationConfig) -> Self {
        Self {
            container: ContainerRule::standard(config),
            unit: CompositeRule::standard_unit(config),
        }
    }
}

/// Top-level entry point: runs the rule set over the container and each of
/// its units and aggregates one verdict.
pub struct VerificationPolicy<'a> {
    rules: RuleSet,
    registry: Box<dyn HashAlgorithmRegistry + 'a>,
    signatures: &'a dyn SignatureVerifier,
}

impl<'a> VerificationPolicy<'a> {
    pub fn new(
        config: &VerificationConfig,
        signatures: &'a dyn SignatureVerifier,
    ) -> CoreResult<Self> {
        let registry = DefaultAlgorithmRegistry::v1()?.with_overrides(&config.algorithm_status)?;
        Ok(Self::with_registry(config, Box::new(registry), signatures))
    }

    pub fn with_registry(
        config: &VerificationConfig,
        registry: Box<dyn HashAlgorithmRegistry + 'a>,
        signatures: &'a dyn SignatureVerifier,
    ) -> Self {
        Self {
            rules: RuleSet::standard(config),
            registry,
            signatures,
        }
    }

    /// Never fails on data-quality problems; they all end up in the verdict.
    pub fn verify(&self, container: &Container) -> ContainerVerdict {
        let mut holder = ResultHolder::new();

        let ctx = self.context(Scope::Container);
        ContainerRule::verify_all(&self.rules.container, container, &ctx, &mut holder);

        for (idx, unit) in container.units.iter().enumerate() {
            // Each unit writes to its own holder; merged once the branch is done.
            let mut unit_holder = ResultHolder::new();
            let ctx = self.context(Scope::Unit(idx));
            let _ = self.rules.unit.verify(unit, &ctx, &mut unit_holder);
            tracing::debug!(
                unit = %unit.id,
                outcome = ?unit_holder.aggregated_result(&ctx.scope),
                "unit verified"
            );
            holder.merge(unit_holder);
        }

        let overall = holder.overall();
        let (mut results, mut signatures) = holder.into_parts();
        let container_results = results.remove(&Scope::Container).unwrap_or_default();
        let units = container
            .units
            .iter()
            .enumerate()
            .map(|(idx, unit)| {
                let scope = Scope::Unit(idx);
                let results = results.remove(&scope).unwrap_or_default();
                UnitVerdict {
                    unit_id: unit.id.clone(),
                    overall: aggregate(results.iter().map(|r| r.outcome)),
                    results,
                    signature: signatures.remove(&scope),
                }
            })
            .collect();

        ContainerVerdict {
            overall,
            container_results,
            units,
        }
    }

    fn context(&self, scope: Scope) -> RuleContext<'_> {
        RuleContext {
            scope,
            registry: self.registry.as_ref(),
            signatures: self.signatures,
        }
    }
}
