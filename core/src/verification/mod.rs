pub mod holder;
pub mod outcome;
pub mod result;

pub use holder::{ResultHolder, Scope};
pub use outcome::{aggregate, Outcome, RuleState};
pub use result::VerificationResult;
