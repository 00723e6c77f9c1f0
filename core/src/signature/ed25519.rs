use crate::container::{Manifest, Signature};
use crate::error::{CoreError, CoreResult};
use crate::signature::{SignatureOutcome, SignatureVerifier};
use crate::verification::Outcome;
use ed25519_dalek::{Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

pub const ED25519_DETACHED_V1: &str = "ed25519-detached-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedHashFile {
    pub algorithm: String,
    pub digest: String,
}

/// On-disk form of a detached Ed25519 signature over the signed digest bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ed25519SignatureFile {
    #[serde(rename = "type")]
    pub signature_type: String,
    pub signed_hash: SignedHashFile,
    pub public_key: String,
    pub signature: String,
}

/// Valid signature by a trusted key → OK, by any other key → WARN, invalid → NOK.
pub struct Ed25519DetachedVerifier {
    trusted_keys: Vec<VerifyingKey>,
}

impl Ed25519DetachedVerifier {
    pub fn new(trusted_keys: Vec<VerifyingKey>) -> Self {
        Self { trusted_keys }
    }

    pub fn from_hex_keys<S: AsRef<str>>(keys: &[S]) -> CoreResult<Self> {
        let mut out = Vec::with_capacity(keys.len());
        for k in keys {
            out.push(parse_public_key(k.as_ref())?);
        }
        Ok(Self::new(out))
    }
}

fn parse_public_key(hex_key: &str) -> CoreResult<VerifyingKey> {
    let raw = hex::decode(hex_key.trim())
        .map_err(|e| CoreError::Signature(format!("public key is not hex: {}", e)))?;
    let arr: [u8; 32] = raw
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::Signature("public key must be 32 bytes".to_string()))?;
    VerifyingKey::from_bytes(&arr)
        .map_err(|e| CoreError::Signature(format!("invalid public key: {}", e)))
}

impl SignatureVerifier for Ed25519DetachedVerifier {
    fn is_supported(&self, signature: &Signature) -> bool {
        signature.signature_type == ED25519_DETACHED_V1
    }

    fn verify(&self, signature_bytes: &[u8], manifest: &Manifest) -> CoreResult<SignatureOutcome> {
        let file: Ed25519SignatureFile = serde_json::from_slice(signature_bytes)
            .map_err(|e| CoreError::Signature(format!("malformed signature: {}", e)))?;
        if file.signature_type != ED25519_DETACHED_V1 {
            return Err(CoreError::Signature(format!(
                "unexpected signature type {}",
                file.signature_type
            )));
        }
        let key = parse_public_key(&file.public_key)?;
        let message = hex::decode(&file.signed_hash.digest)
            .map_err(|e| CoreError::Signature(format!("signed digest is not hex: {}", e)))?;
        let sig_raw = hex::decode(&file.signature)
            .map_err(|e| CoreError::Signature(format!("signature is not hex: {}", e)))?;
        let sig = ed25519_dalek::Signature::from_slice(&sig_raw)
            .map_err(|e| CoreError::Signature(format!("signature must be 64 bytes: {}", e)))?;

        let trusted = self.trusted_keys.contains(&key);
        let (simplified, status) = match key.verify(&message, &sig) {
            Ok(()) if trusted => (Outcome::OK, "VALID"),
            Ok(()) => (Outcome::WARN, "SIGNER_NOT_TRUSTED"),
            Err(_) => (Outcome::NOK, "INVALID"),
        };
        Ok(SignatureOutcome {
            simplified,
            detail: serde_json::json!({
                "scheme": ED25519_DETACHED_V1,
                "status": status,
                "signer_public_key": hex::encode(key.as_bytes()),
                "signed_hash_algorithm": file.signed_hash.algorithm,
                "manifest": manifest.uri,
            }),
        })
    }
}
