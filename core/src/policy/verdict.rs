use crate::rules::RuleName;
use crate::signature::SignatureOutcome;
use crate::verification::{Outcome, VerificationResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitVerdict {
    pub unit_id: String,
    pub overall: Outcome,
    pub results: Vec<VerificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerVerdict {
    pub overall: Outcome,
    pub container_results: Vec<VerificationResult>,
    pub units: Vec<UnitVerdict>,
}

impl ContainerVerdict {
    pub fn unit(&self, unit_id: &str) -> Option<&UnitVerdict> {
        self.units.iter().find(|u| u.unit_id == unit_id)
    }
}

impl UnitVerdict {
    pub fn results_for<'a>(
        &'a self,
        rule: RuleName,
    ) -> impl Iterator<Item = &'a VerificationResult> + 'a {
        self.results.iter().filter(move |r| r.rule == rule)
    }

    pub fn result_for(
        &self,
        rule: RuleName,
        tested_path: &str,
    ) -> Option<&VerificationResult> {
        self.results.iter().rev().find(|r| r.is_for(rule, tested_path))
    }
}
