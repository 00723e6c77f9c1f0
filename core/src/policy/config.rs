use crate::error::{CoreError, CoreResult};
use crate::hashing::AlgorithmStatus;
use crate::rules::RuleName;
use crate::verification::RuleState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const CONFIG_VERSION_V1: &str = "envelope_verification_config_v1";

/// Policy-wide configuration, passed explicitly into the rule constructors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationConfig {
    pub config_version: String,
    /// Severity per rule; unlisted rules run at `FAIL`.
    #[serde(default)]
    pub rule_states: BTreeMap<RuleName, RuleState>,
    /// Status overrides for computable hash algorithms.
    #[serde(default)]
    pub algorithm_status: BTreeMap<String, AlgorithmStatus>,
    /// Hex Ed25519 public keys whose signatures verify as OK rather than WARN.
    #[serde(default)]
    pub trusted_signer_keys: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION_V1.to_string(),
            rule_states: BTreeMap::new(),
            algorithm_status: BTreeMap::new(),
            trusted_signer_keys: Vec::new(),
        }
    }
}

impl VerificationConfig {
    /// Embedded defaults shipped with the crate.
    pub fn default_v1() -> CoreResult<Self> {
        Self::from_json_str(include_str!("default_config_v1.json"))
    }

    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let cfg: VerificationConfig = serde_json::from_str(json)?;
        if cfg.config_version != CONFIG_VERSION_V1 {
            return Err(CoreError::InvalidInput(format!(
                "unsupported config_version {}",
                cfg.config_version
            )));
        }
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    pub fn rule_state(&self, rule: RuleName) -> RuleState {
        self.rule_states.get(&rule).copied().unwrap_or_default()
    }

    pub fn with_rule_state(mut self, rule: RuleName, state: RuleState) -> Self {
        self.rule_states.insert(rule, state);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let cfg = VerificationConfig::default_v1().unwrap();
        assert_eq!(cfg.rule_state(RuleName::ContainerUnknownFiles), RuleState::WARN);
        assert_eq!(cfg.rule_state(RuleName::DocumentIntegrity), RuleState::FAIL);
    }

    #[test]
    fn unknown_rule_names_are_rejected() {
        let r = VerificationConfig::from_json_str(
            r#"{"config_version":"envelope_verification_config_v1","rule_states":{"CHK.NOT_A_RULE":"WARN"}}"#,
        );
        assert!(r.is_err());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let r = VerificationConfig::from_json_str(r#"{"config_version":"v0"}"#);
        assert!(matches!(r, Err(CoreError::InvalidInput(_))));
    }
}
