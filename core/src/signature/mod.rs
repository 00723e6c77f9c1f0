pub mod ed25519;

use crate::container::{Manifest, Signature};
use crate::error::CoreResult;
use crate::verification::Outcome;
use serde::{Deserialize, Serialize};

pub use ed25519::{Ed25519DetachedVerifier, Ed25519SignatureFile, ED25519_DETACHED_V1};

/// Result of the external signature scheme: a simplified projection plus the
/// scheme-specific detail, passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignatureOutcome {
    pub simplified: Outcome,
    pub detail: serde_json::Value,
}

/// Injected signature-verification capability.
pub trait SignatureVerifier {
    fn is_supported(&self, signature: &Signature) -> bool;

    fn verify(&self, signature_bytes: &[u8], manifest: &Manifest) -> CoreResult<SignatureOutcome>;
}
