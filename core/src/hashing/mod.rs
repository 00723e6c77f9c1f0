pub mod algorithm;
pub mod element;
pub mod reference;
pub mod registry;

pub use algorithm::HashAlgorithm;
pub use element::{MultiHashElement, Payload};
pub use reference::{FileReference, HashEntry};
pub use registry::{AlgorithmStatus, DefaultAlgorithmRegistry, HashAlgorithmRegistry};
