use crate::error::CoreResult;
use crate::hashing::algorithm::HashAlgorithm;
use std::fs::File;
use std::path::PathBuf;

/// Backing storage for an element's bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl Payload {
    pub fn digest_hex(&self, algorithm: HashAlgorithm) -> CoreResult<String> {
        match self {
            Payload::Bytes(b) => Ok(algorithm.digest_hex(b)),
            Payload::File(p) => algorithm.digest_reader(File::open(p)?),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(b)
    }
}

impl From<&[u8]> for Payload {
    fn from(b: &[u8]) -> Self {
        Payload::Bytes(b.to_vec())
    }
}

/// Anything able to produce its own digest on demand.
pub trait MultiHashElement {
    fn element_path(&self) -> &str;

    /// Lower-case hex digest of the element's bytes. Fails with
    /// [`crate::error::CoreError::Io`] when the bytes cannot be read.
    fn data_hash(&self, algorithm: HashAlgorithm) -> CoreResult<String>;
}
