use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashEntry {
    pub algorithm: String,
    pub digest: String, // hex
}

impl HashEntry {
    pub fn new(algorithm: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            digest: digest.into(),
        }
    }
}

/// URI + declared content type + non-empty multi-hash.
///
/// Construction (including deserialization) rejects an empty hash list and
/// an algorithm listed twice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawFileReference")]
pub struct FileReference {
    uri: String,
    content_type: String,
    hashes: Vec<HashEntry>,
}

#[derive(Deserialize)]
struct RawFileReference {
    uri: String,
    #[serde(default)]
    content_type: String,
    hashes: Vec<HashEntry>,
}

impl TryFrom<RawFileReference> for FileReference {
    type Error = CoreError;

    fn try_from(raw: RawFileReference) -> CoreResult<Self> {
        FileReference::new(raw.uri, raw.content_type, raw.hashes)
    }
}

impl FileReference {
    pub fn new(
        uri: impl Into<String>,
        content_type: impl Into<String>,
        hashes: Vec<HashEntry>,
    ) -> CoreResult<Self> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "file reference uri must not be empty".to_string(),
            ));
        }
        if hashes.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "file reference {} has no hashes",
                uri
            )));
        }
        let mut seen = BTreeSet::new();
        for h in &hashes {
            if !seen.insert(h.algorithm.trim().to_ascii_uppercase()) {
                return Err(CoreError::InvalidInput(format!(
                    "file reference {} lists {} more than once",
                    uri, h.algorithm
                )));
            }
        }
        Ok(Self {
            uri,
            content_type: content_type.into(),
            hashes,
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn hashes(&self) -> &[HashEntry] {
        &self.hashes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_duplicate_hash_lists() {
        assert!(FileReference::new("a.txt", "text/plain", vec![]).is_err());
        let dup = vec![
            HashEntry::new("SHA-256", "aa"),
            HashEntry::new("sha-256", "bb"),
        ];
        assert!(FileReference::new("a.txt", "text/plain", dup).is_err());
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let ok: FileReference = serde_json::from_str(
            r#"{"uri":"doc.txt","content_type":"text/plain","hashes":[{"algorithm":"SHA-256","digest":"00"}]}"#,
        )
        .unwrap();
        assert_eq!(ok.uri(), "doc.txt");
        let empty: Result<FileReference, _> =
            serde_json::from_str(r#"{"uri":"doc.txt","content_type":"text/plain","hashes":[]}"#);
        assert!(empty.is_err());
    }
}
