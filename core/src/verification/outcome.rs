use serde::{Deserialize, Serialize};

/// Verification outcome, ordered by severity: `OK < WARN < NOK`.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Outcome {
    #[default]
    OK,
    WARN,
    NOK,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        *self == Outcome::OK
    }
}

/// Worst-of aggregation. An empty input aggregates to `OK`.
pub fn aggregate<I: IntoIterator<Item = Outcome>>(outcomes: I) -> Outcome {
    outcomes.into_iter().max().unwrap_or(Outcome::OK)
}

/// Configured severity of a rule.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RuleState {
    #[default]
    FAIL,
    WARN,
    IGNORE,
}

impl RuleState {
    /// Outcome recorded on logical failure; `None` when failures are dropped.
    pub fn failure_outcome(&self) -> Option<Outcome> {
        match self {
            RuleState::FAIL => Some(Outcome::NOK),
            RuleState::WARN => Some(Outcome::WARN),
            RuleState::IGNORE => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        *self == RuleState::IGNORE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_is_worst_of() {
        assert_eq!(aggregate([]), Outcome::OK);
        assert_eq!(aggregate([Outcome::OK, Outcome::OK]), Outcome::OK);
        assert_eq!(aggregate([Outcome::OK, Outcome::WARN]), Outcome::WARN);
        assert_eq!(
            aggregate([Outcome::WARN, Outcome::NOK, Outcome::OK]),
            Outcome::NOK
        );
    }

    #[test]
    fn failure_outcome_follows_state() {
        assert_eq!(RuleState::FAIL.failure_outcome(), Some(Outcome::NOK));
        assert_eq!(RuleState::WARN.failure_outcome(), Some(Outcome::WARN));
        assert_eq!(RuleState::IGNORE.failure_outcome(), None);
    }
}
