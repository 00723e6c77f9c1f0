use crate::error::CoreResult;
use crate::hashing::{FileReference, HashAlgorithm, MultiHashElement, Payload};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct Container {
    pub mime_type: Option<String>,
    pub units: Vec<SignatureContent>,
    pub unknown_files: BTreeSet<String>,
}

/// One signed manifest tree.
#[derive(Debug, Clone, Default)]
pub struct SignatureContent {
    /// Stable identifier, normally the root manifest's path.
    pub id: String,
    pub manifest: Option<Manifest>,
    pub documents_manifest: Option<DocumentsManifest>,
    pub annotations_manifest: Option<AnnotationsManifest>,
    pub annotation_manifests: BTreeMap<String, SingleAnnotationManifest>,
    pub documents: BTreeMap<String, Document>,
    pub annotations: BTreeMap<String, Annotation>,
    pub signature: Option<Signature>,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub uri: String,
    pub documents_manifest: FileReference,
    pub annotations_manifest: FileReference,
    /// The signature signs this manifest's hash, so it is referenced by URI only.
    pub signature_uri: String,
    pub encoded: Payload,
}

#[derive(Debug, Clone)]
pub struct DocumentsManifest {
    pub uri: String,
    pub documents: Vec<FileReference>,
    pub encoded: Payload,
}

#[derive(Debug, Clone)]
pub struct AnnotationsManifest {
    pub uri: String,
    pub annotation_manifests: Vec<FileReference>,
    pub encoded: Payload,
}

#[derive(Debug, Clone)]
pub struct SingleAnnotationManifest {
    pub uri: String,
    pub documents_manifest: FileReference,
    pub annotation: FileReference,
    pub encoded: Payload,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub uri: String,
    pub content: Payload,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub uri: String,
    pub content: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHash {
    pub algorithm: String,
    pub digest: String, // hex
}

#[derive(Debug, Clone)]
pub struct Signature {
    pub uri: String,
    pub signature_type: String,
    pub bytes: Option<Vec<u8>>,
    pub signed_hash: Option<SignedHash>,
}

macro_rules! multi_hash_element {
    ($ty:ty, $field:ident) => {
        impl MultiHashElement for $ty {
            fn element_path(&self) -> &str {
                &self.uri
            }

            fn data_hash(&self, algorithm: HashAlgorithm) -> CoreResult<String> {
                self.$field.digest_hex(algorithm)
            }
        }
    };
}

multi_hash_element!(Manifest, encoded);
multi_hash_element!(DocumentsManifest, encoded);
multi_hash_element!(AnnotationsManifest, encoded);
multi_hash_element!(SingleAnnotationManifest, encoded);
multi_hash_element!(Document, content);
multi_hash_element!(Annotation, content);

impl SignatureContent {
    /// The Documents-Manifest, provided it sits where the root manifest says.
    pub fn referenced_documents_manifest(&self) -> Option<&DocumentsManifest> {
        let m = self.manifest.as_ref()?;
        self.documents_manifest
            .as_ref()
            .filter(|dm| dm.uri == m.documents_manifest.uri())
    }

    pub fn referenced_annotations_manifest(&self) -> Option<&AnnotationsManifest> {
        let m = self.manifest.as_ref()?;
        self.annotations_manifest
            .as_ref()
            .filter(|am| am.uri == m.annotations_manifest.uri())
    }

    /// Every path this unit claims, used to derive the unknown-file set.
    pub fn claimed_paths(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        out.insert(self.id.clone());
        if let Some(m) = &self.manifest {
            out.insert(m.uri.clone());
            out.insert(m.documents_manifest.uri().to_string());
            out.insert(m.annotations_manifest.uri().to_string());
            out.insert(m.signature_uri.clone());
        }
        if let Some(dm) = &self.documents_manifest {
            out.extend(dm.documents.iter().map(|r| r.uri().to_string()));
        }
        if let Some(am) = &self.annotations_manifest {
            out.extend(am.annotation_manifests.iter().map(|r| r.uri().to_string()));
        }
        for sam in self.annotation_manifests.values() {
            out.insert(sam.annotation.uri().to_string());
        }
        out
    }
}
