pub mod config;
pub mod verdict;
pub mod verification_policy;

pub use config::VerificationConfig;
pub use verdict::{ContainerVerdict, UnitVerdict};
pub use verification_policy::{RuleSet, VerificationPolicy};
