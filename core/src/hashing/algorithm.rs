use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::io::Read;

/// Digest algorithms this runtime can compute.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    SHA1,
    SHA224,
    SHA256,
    SHA384,
    SHA512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::SHA1,
        HashAlgorithm::SHA224,
        HashAlgorithm::SHA256,
        HashAlgorithm::SHA384,
        HashAlgorithm::SHA512,
    ];

    /// Canonical identifier as written in File References.
    pub fn id(&self) -> &'static str {
        match self {
            HashAlgorithm::SHA1 => "SHA-1",
            HashAlgorithm::SHA224 => "SHA-224",
            HashAlgorithm::SHA256 => "SHA-256",
            HashAlgorithm::SHA384 => "SHA-384",
            HashAlgorithm::SHA512 => "SHA-512",
        }
    }

    pub fn oid(&self) -> &'static str {
        match self {
            HashAlgorithm::SHA1 => "1.3.14.3.2.26",
            HashAlgorithm::SHA224 => "2.16.840.1.101.3.4.2.4",
            HashAlgorithm::SHA256 => "2.16.840.1.101.3.4.2.1",
            HashAlgorithm::SHA384 => "2.16.840.1.101.3.4.2.2",
            HashAlgorithm::SHA512 => "2.16.840.1.101.3.4.2.3",
        }
    }

    /// Resolves an identifier (name or OID, case-insensitive). `None` means
    /// the runtime cannot compute it.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|a| {
            a.id().eq_ignore_ascii_case(id)
                || a.id().replace('-', "").eq_ignore_ascii_case(id)
                || a.oid() == id
        })
    }

    pub fn digest_hex(&self, bytes: &[u8]) -> String {
        let mut h = DigestState::new(*self);
        h.update(bytes);
        h.finalize_hex()
    }

    pub fn digest_reader<R: Read>(&self, mut reader: R) -> CoreResult<String> {
        let mut h = DigestState::new(*self);
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            h.update(&buf[..n]);
        }
        Ok(h.finalize_hex())
    }
}

enum DigestState {
    Sha1(sha1::Sha1),
    Sha224(sha2::Sha224),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::SHA1 => DigestState::Sha1(sha1::Sha1::new()),
            HashAlgorithm::SHA224 => DigestState::Sha224(sha2::Sha224::new()),
            HashAlgorithm::SHA256 => DigestState::Sha256(sha2::Sha256::new()),
            HashAlgorithm::SHA384 => DigestState::Sha384(sha2::Sha384::new()),
            HashAlgorithm::SHA512 => DigestState::Sha512(sha2::Sha512::new()),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            DigestState::Sha1(h) => h.update(bytes),
            DigestState::Sha224(h) => h.update(bytes),
            DigestState::Sha256(h) => h.update(bytes),
            DigestState::Sha384(h) => h.update(bytes),
            DigestState::Sha512(h) => h.update(bytes),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            DigestState::Sha1(h) => hex::encode(h.finalize()),
            DigestState::Sha224(h) => hex::encode(h.finalize()),
            DigestState::Sha256(h) => hex::encode(h.finalize()),
            DigestState::Sha384(h) => hex::encode(h.finalize()),
            DigestState::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}
