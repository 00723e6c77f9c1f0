use crate::signature::SignatureOutcome;
use crate::verification::outcome::{aggregate, Outcome};
use crate::verification::result::VerificationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partition key for results: the container itself or one of its units.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    Container,
    /// Position of the unit within the container.
    Unit(usize),
}

/// Append-only, run-scoped store of verification results.
///
/// Not meant for concurrent writers. A unit branch can be verified into a
/// fresh holder and folded into the run's holder with [`ResultHolder::merge`].
#[derive(Debug, Default)]
pub struct ResultHolder {
    results: BTreeMap<Scope, Vec<VerificationResult>>,
    signature_results: BTreeMap<Scope, SignatureOutcome>,
}

impl ResultHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, scope: &Scope, result: VerificationResult) {
        tracing::debug!(
            rule = result.rule.as_str(),
            path = %result.tested_path,
            outcome = ?result.outcome,
            "result recorded"
        );
        self.results.entry(scope.clone()).or_default().push(result);
    }

    /// Results for `scope` in insertion order.
    pub fn results(&self, scope: &Scope) -> &[VerificationResult] {
        self.results.get(scope).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn aggregated_result(&self, scope: &Scope) -> Outcome {
        aggregate(self.results(scope).iter().map(|r| r.outcome))
    }

    /// Worst-of over the results matching `predicate`, limited to the
    /// `limit` most recent matches when given.
    pub fn filtered_aggregated_result<P>(
        &self,
        scope: &Scope,
        predicate: P,
        limit: Option<usize>,
    ) -> Outcome
    where
        P: Fn(&VerificationResult) -> bool,
    {
        let matching = self.results(scope).iter().rev().filter(|r| predicate(r));
        match limit {
            Some(n) => aggregate(matching.take(n).map(|r| r.outcome)),
            None => aggregate(matching.map(|r| r.outcome)),
        }
    }

    pub fn add_signature_result(&mut self, scope: &Scope, outcome: SignatureOutcome) {
        self.signature_results.insert(scope.clone(), outcome);
    }

    pub fn signature_result(&self, scope: &Scope) -> Option<&SignatureOutcome> {
        self.signature_results.get(scope)
    }

    /// Worst-of across every scope.
    pub fn overall(&self) -> Outcome {
        aggregate(self.results.values().flatten().map(|r| r.outcome))
    }

    /// Appends everything recorded in `child` after this holder's own results.
    pub fn merge(&mut self, child: ResultHolder) {
        for (scope, results) in child.results {
            self.results.entry(scope).or_default().extend(results);
        }
        self.signature_results.extend(child.signature_results);
    }

    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<Scope, Vec<VerificationResult>>,
        BTreeMap<Scope, SignatureOutcome>,
    ) {
        (self.results, self.signature_results)
    }
}
