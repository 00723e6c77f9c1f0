use crate::container::model::{
    Annotation, AnnotationsManifest, Container, Document, DocumentsManifest, Manifest, Signature,
    SignatureContent, SignedHash, SingleAnnotationManifest,
};
use crate::error::{CoreError, CoreResult};
use crate::hashing::{FileReference, Payload};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const MIMETYPE_ENTRY: &str = "mimetype";
const MANIFEST_PREFIX: &str = "META-INF/manifest";

#[derive(Deserialize)]
struct ManifestJson {
    documents_manifest: FileReference,
    annotations_manifest: FileReference,
    signature: String,
}

#[derive(Deserialize)]
struct DocumentsManifestJson {
    documents: Vec<FileReference>,
}

#[derive(Deserialize)]
struct AnnotationsManifestJson {
    annotations: Vec<FileReference>,
}

#[derive(Deserialize)]
struct SingleAnnotationManifestJson {
    documents_manifest: FileReference,
    annotation: FileReference,
}

#[derive(Deserialize)]
struct SignatureJson {
    #[serde(rename = "type")]
    signature_type: String,
    signed_hash: Option<SignedHashJson>,
}

#[derive(Deserialize)]
struct SignedHashJson {
    algorithm: String,
    digest: String,
}

/// Loads a container from its zip packaging.
///
/// Only archive-level problems are errors. Missing or unparseable members are
/// left absent in the model so the rules can report them.
pub struct ContainerReader;

impl ContainerReader {
    pub fn read_zip(path: &Path) -> CoreResult<Container> {
        let file = File::open(path)?;
        Self::read_zip_from(file)
    }

    pub fn read_zip_from<R: Read + Seek>(reader: R) -> CoreResult<Container> {
        let mut zip = ZipArchive::new(reader).map_err(|e| CoreError::Zip(e.to_string()))?;
        let mut entries: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        for i in 0..zip.len() {
            let mut f = zip.by_index(i).map_err(|e| CoreError::Zip(e.to_string()))?;
            if f.is_dir() {
                continue;
            }
            let name = f.name().to_string();
            let mut out = Vec::new();
            f.read_to_end(&mut out)?;
            entries.insert(name, out);
        }
        Ok(Self::from_entries(&entries))
    }

    /// Assembles the model from already-extracted archive entries.
    pub fn from_entries(entries: &BTreeMap<String, Vec<u8>>) -> Container {
        let mime_type = entries
            .get(MIMETYPE_ENTRY)
            .map(|b| String::from_utf8_lossy(b).trim().to_string());

        let units: Vec<SignatureContent> = entries
            .keys()
            .filter(|k| k.starts_with(MANIFEST_PREFIX) && k.ends_with(".json"))
            .map(|k| read_unit(k, entries))
            .collect();

        let mut claimed: BTreeSet<String> = BTreeSet::new();
        claimed.insert(MIMETYPE_ENTRY.to_string());
        for u in &units {
            claimed.extend(u.claimed_paths());
        }
        let unknown_files: BTreeSet<String> = entries
            .keys()
            .filter(|k| !claimed.contains(*k))
            .cloned()
            .collect();
        if !unknown_files.is_empty() {
            tracing::warn!(count = unknown_files.len(), "container holds unreferenced entries");
        }

        Container {
            mime_type,
            units,
            unknown_files,
        }
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &str, bytes: &[u8]) -> Option<T> {
    match serde_json::from_slice(bytes) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(path, error = %e, "unparseable container member treated as absent");
            None
        }
    }
}

fn read_unit(manifest_path: &str, entries: &BTreeMap<String, Vec<u8>>) -> SignatureContent {
    let mut unit = SignatureContent {
        id: manifest_path.to_string(),
        ..SignatureContent::default()
    };
    let bytes = &entries[manifest_path];
    let m: ManifestJson = match parse_json(manifest_path, bytes) {
        Some(m) => m,
        None => return unit,
    };

    if let Some(b) = entries.get(m.documents_manifest.uri()) {
        if let Some(dm) = parse_json::<DocumentsManifestJson>(m.documents_manifest.uri(), b) {
            for r in &dm.documents {
                if let Some(content) = entries.get(r.uri()) {
                    unit.documents.insert(
                        r.uri().to_string(),
                        Document {
                            uri: r.uri().to_string(),
                            content: Payload::Bytes(content.clone()),
                        },
                    );
                }
            }
            unit.documents_manifest = Some(DocumentsManifest {
                uri: m.documents_manifest.uri().to_string(),
                documents: dm.documents,
                encoded: Payload::Bytes(b.clone()),
            });
        }
    }

    if let Some(b) = entries.get(m.annotations_manifest.uri()) {
        if let Some(am) = parse_json::<AnnotationsManifestJson>(m.annotations_manifest.uri(), b) {
            for r in &am.annotations {
                let Some(sb) = entries.get(r.uri()) else {
                    continue;
                };
                let Some(sam) = parse_json::<SingleAnnotationManifestJson>(r.uri(), sb) else {
                    continue;
                };
                if let Some(data) = entries.get(sam.annotation.uri()) {
                    unit.annotations.insert(
                        sam.annotation.uri().to_string(),
                        Annotation {
                            uri: sam.annotation.uri().to_string(),
                            content: Payload::Bytes(data.clone()),
                        },
                    );
                }
                unit.annotation_manifests.insert(
                    r.uri().to_string(),
                    SingleAnnotationManifest {
                        uri: r.uri().to_string(),
                        documents_manifest: sam.documents_manifest,
                        annotation: sam.annotation,
                        encoded: Payload::Bytes(sb.clone()),
                    },
                );
            }
            unit.annotations_manifest = Some(AnnotationsManifest {
                uri: m.annotations_manifest.uri().to_string(),
                annotation_manifests: am.annotations,
                encoded: Payload::Bytes(b.clone()),
            });
        }
    }

    if let Some(sig_bytes) = entries.get(&m.signature) {
        unit.signature = Some(read_signature(&m.signature, sig_bytes));
    }

    unit.manifest = Some(Manifest {
        uri: manifest_path.to_string(),
        documents_manifest: m.documents_manifest,
        annotations_manifest: m.annotations_manifest,
        signature_uri: m.signature,
        encoded: Payload::Bytes(bytes.clone()),
    });
    unit
}

fn read_signature(path: &str, bytes: &[u8]) -> Signature {
    match parse_json::<SignatureJson>(path, bytes) {
        Some(s) => Signature {
            uri: path.to_string(),
            signature_type: s.signature_type,
            bytes: Some(bytes.to_vec()),
            signed_hash: s.signed_hash.map(|h| SignedHash {
                algorithm: h.algorithm,
                digest: h.digest,
            }),
        },
        None => Signature {
            uri: path.to_string(),
            signature_type: "unknown".to_string(),
            bytes: Some(bytes.to_vec()),
            signed_hash: None,
        },
    }
}
