use crate::rules::RuleName;
use crate::verification::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// One rule's verdict on one tested element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationResult {
    pub rule: RuleName,
    pub tested_path: String,
    pub outcome: Outcome,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl VerificationResult {
    pub fn ok(rule: RuleName, tested_path: impl Into<String>) -> Self {
        Self {
            rule,
            tested_path: tested_path.into(),
            outcome: Outcome::OK,
            message: "ok".to_string(),
            cause: None,
        }
    }

    pub fn failed(
        rule: RuleName,
        tested_path: impl Into<String>,
        outcome: Outcome,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule,
            tested_path: tested_path.into(),
            outcome,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl std::fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn is_for(&self, rule: RuleName, tested_path: &str) -> bool {
        self.rule == rule && self.tested_path == tested_path
    }
}
