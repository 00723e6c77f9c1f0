#![allow(dead_code)]

use ed25519_dalek::{Signer, SigningKey};
use envelope_core::container::{Container, ContainerReader, CONTAINER_MIME_TYPE};
use envelope_core::hashing::{FileReference, HashAlgorithm, HashEntry};
use envelope_core::policy::{ContainerVerdict, VerificationConfig, VerificationPolicy};
use envelope_core::signature::{Ed25519DetachedVerifier, ED25519_DETACHED_V1};
use std::collections::BTreeMap;

pub const FULLY_REMOVABLE: &str = "application/json; removable=full";
pub const VALUE_REMOVABLE: &str = "application/json; removable=value";
pub const NON_REMOVABLE: &str = "application/json";

pub fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

pub fn trusted_verifier() -> Ed25519DetachedVerifier {
    Ed25519DetachedVerifier::new(vec![signing_key().verifying_key()])
}

/// Writes the entries of a signed container, one unit per builder.
pub struct ContainerBuilder {
    unit: usize,
    documents: Vec<(String, Vec<u8>)>,
    annotations: Vec<(String, String, Vec<u8>)>,
    algorithms: Vec<String>,
}

pub struct UnitPaths {
    pub manifest: String,
    pub documents_manifest: String,
    pub annotations_manifest: String,
    pub signature: String,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            unit: 1,
            documents: Vec::new(),
            annotations: Vec::new(),
            algorithms: vec!["SHA-256".to_string()],
        }
    }

    pub fn unit(mut self, n: usize) -> Self {
        self.unit = n;
        self
    }

    pub fn document(mut self, uri: &str, bytes: &[u8]) -> Self {
        self.documents.push((uri.to_string(), bytes.to_vec()));
        self
    }

    pub fn annotation(mut self, uri: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.annotations
            .push((uri.to_string(), content_type.to_string(), bytes.to_vec()));
        self
    }

    pub fn hash_algorithms(mut self, algs: &[&str]) -> Self {
        self.algorithms = algs.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn paths(&self) -> UnitPaths {
        UnitPaths {
            manifest: format!("META-INF/manifest{}.json", self.unit),
            documents_manifest: format!("META-INF/documents{}.json", self.unit),
            annotations_manifest: format!("META-INF/annotations{}.json", self.unit),
            signature: format!("META-INF/signature{}.json", self.unit),
        }
    }

    pub fn annotation_manifest_path(&self, idx: usize) -> String {
        format!("META-INF/annotation{}_{}.json", self.unit, idx)
    }

    fn reference(&self, uri: &str, content_type: &str, bytes: &[u8]) -> FileReference {
        let hashes = self
            .algorithms
            .iter()
            .map(|a| {
                let digest = HashAlgorithm::from_id(a)
                    .map(|alg| alg.digest_hex(bytes))
                    .unwrap_or_else(|| "00".repeat(32));
                HashEntry::new(a.clone(), digest)
            })
            .collect();
        FileReference::new(uri, content_type, hashes).unwrap()
    }

    pub fn entries(&self) -> BTreeMap<String, Vec<u8>> {
        let p = self.paths();
        let mut out = BTreeMap::new();
        out.insert("mimetype".to_string(), CONTAINER_MIME_TYPE.as_bytes().to_vec());

        let mut doc_refs = Vec::new();
        for (uri, bytes) in &self.documents {
            doc_refs.push(self.reference(uri, "text/plain", bytes));
            out.insert(uri.clone(), bytes.clone());
        }
        let dm = serde_json::to_vec(&serde_json::json!({ "documents": doc_refs })).unwrap();
        let dm_ref = self.reference(&p.documents_manifest, "application/json", &dm);
        out.insert(p.documents_manifest.clone(), dm);

        let mut sam_refs = Vec::new();
        for (idx, (uri, content_type, bytes)) in self.annotations.iter().enumerate() {
            let data_ref = self.reference(uri, content_type, bytes);
            out.insert(uri.clone(), bytes.clone());
            let sam = serde_json::to_vec(&serde_json::json!({
                "documents_manifest": dm_ref,
                "annotation": data_ref,
            }))
            .unwrap();
            let sam_path = self.annotation_manifest_path(idx);
            sam_refs.push(self.reference(&sam_path, content_type, &sam));
            out.insert(sam_path, sam);
        }
        let am = serde_json::to_vec(&serde_json::json!({ "annotations": sam_refs })).unwrap();
        let am_ref = self.reference(&p.annotations_manifest, "application/json", &am);
        out.insert(p.annotations_manifest.clone(), am);

        let manifest = serde_json::to_vec(&serde_json::json!({
            "documents_manifest": dm_ref,
            "annotations_manifest": am_ref,
            "signature": p.signature,
        }))
        .unwrap();
        let digest = HashAlgorithm::SHA256.digest_hex(&manifest);
        out.insert(p.manifest.clone(), manifest);

        let sig = signing_key().sign(&hex::decode(&digest).unwrap());
        let sig_file = serde_json::json!({
            "type": ED25519_DETACHED_V1,
            "signed_hash": { "algorithm": "SHA-256", "digest": digest },
            "public_key": hex::encode(signing_key().verifying_key().as_bytes()),
            "signature": hex::encode(sig.to_bytes()),
        });
        out.insert(p.signature.clone(), serde_json::to_vec(&sig_file).unwrap());
        out
    }

    pub fn build(&self) -> Container {
        ContainerReader::from_entries(&self.entries())
    }
}

pub fn minimal() -> ContainerBuilder {
    ContainerBuilder::new()
        .document("docs/contract.txt", b"the signed agreement")
        .annotation("annotations/note.json", FULLY_REMOVABLE, b"{\"note\":\"reviewed\"}")
}

pub fn verify_with(config: &VerificationConfig, container: &Container) -> ContainerVerdict {
    let verifier = trusted_verifier();
    let policy = VerificationPolicy::new(config, &verifier).unwrap();
    policy.verify(container)
}

pub fn verify(container: &Container) -> ContainerVerdict {
    verify_with(&VerificationConfig::default_v1().unwrap(), container)
}
