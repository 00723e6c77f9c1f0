use crate::container::{Container, CONTAINER_MIME_TYPE};
use crate::policy::VerificationConfig;
use crate::rules::{Check, RuleContext, RuleName, RuleOutcome};
use crate::verification::ResultHolder;

const MIMETYPE_PATH: &str = "mimetype";

/// Checks over the container as a whole.
pub enum ContainerRule {
    MimeType(Check),
    UnknownFiles(Check),
}

impl ContainerRule {
    pub fn standard(config: &VerificationConfig) -> Vec<ContainerRule> {
        vec![
            ContainerRule::MimeType(Check::configured(RuleName::ContainerMimeType, config)),
            ContainerRule::UnknownFiles(Check::configured(
                RuleName::ContainerUnknownFiles,
                config,
            )),
        ]
    }

    pub fn verify(
        &self,
        container: &Container,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) -> RuleOutcome {
        match self {
            ContainerRule::MimeType(check) => {
                if check.skipped() {
                    return Ok(());
                }
                match container.mime_type.as_deref() {
                    Some(CONTAINER_MIME_TYPE) => {
                        check.pass(ctx, holder, MIMETYPE_PATH);
                        Ok(())
                    }
                    Some(other) => check.fail(
                        ctx,
                        holder,
                        MIMETYPE_PATH,
                        format!("unexpected format marker {}", other),
                        None,
                    ),
                    None => check.fail(ctx, holder, MIMETYPE_PATH, "missing format marker", None),
                }
            }
            ContainerRule::UnknownFiles(check) => {
                if check.skipped() {
                    return Ok(());
                }
                if container.unknown_files.is_empty() {
                    check.pass(ctx, holder, "/");
                    return Ok(());
                }
                let listed: Vec<&str> = container.unknown_files.iter().map(String::as_str).collect();
                check.fail(
                    ctx,
                    holder,
                    "/",
                    format!("unreferenced entries: {}", listed.join(", ")),
                    None,
                )
            }
        }
    }

    /// Runs `rules` in order; a termination stops the remaining container-level checks only.
    pub fn verify_all(
        rules: &[ContainerRule],
        container: &Container,
        ctx: &RuleContext<'_>,
        holder: &mut ResultHolder,
    ) {
        for rule in rules {
            if let Err(t) = rule.verify(container, ctx, holder) {
                tracing::debug!(rule = t.rule.as_str(), "container-level checks stopped");
                break;
            }
        }
    }
}
