pub mod container;
pub mod hashing;
pub mod policy;
pub mod rules;
pub mod signature;
pub mod verification;

pub mod error;
