pub mod model;
pub mod reader;

pub use model::{
    Annotation, AnnotationsManifest, Container, Document, DocumentsManifest, Manifest, Signature,
    SignatureContent, SignedHash, SingleAnnotationManifest,
};
pub use reader::ContainerReader;

/// Format marker expected in the `mimetype` entry.
pub const CONTAINER_MIME_TYPE: &str = "application/vnd.envelope.container+zip";
