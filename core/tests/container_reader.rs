mod common;

use common::{minimal, verify};
use envelope_core::container::ContainerReader;
use envelope_core::error::CoreError;
use envelope_core::rules::RuleName;
use envelope_core::verification::Outcome;
use std::io::Write;
use zip::write::SimpleFileOptions;

#[test]
fn reads_a_zip_container() {
    let b = minimal();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signed.zip");
    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    for (name, bytes) in b.entries() {
        zip.start_file(name.as_str(), SimpleFileOptions::default()).unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.finish().unwrap();

    let container = ContainerReader::read_zip(&path).unwrap();
    assert_eq!(container.units.len(), 1);
    assert!(container.unknown_files.is_empty());
    let unit = &container.units[0];
    assert!(unit.manifest.is_some());
    assert!(unit.documents.contains_key("docs/contract.txt"));
    assert!(unit.annotations.contains_key("annotations/note.json"));
    assert_eq!(verify(&container).overall, Outcome::OK);
}

#[test]
fn non_zip_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not.zip");
    std::fs::write(&path, b"plain text").unwrap();
    assert!(matches!(
        ContainerReader::read_zip(&path),
        Err(CoreError::Zip(_))
    ));
    assert!(matches!(
        ContainerReader::read_zip(&dir.path().join("missing.zip")),
        Err(CoreError::Io(_))
    ));
}

#[test]
fn unparseable_manifest_is_reported_as_missing() {
    let b = minimal();
    let mut entries = b.entries();
    entries.insert(b.paths().manifest, b"{ not json".to_vec());
    let container = ContainerReader::from_entries(&entries);
    assert!(container.units[0].manifest.is_none());

    let verdict = verify(&container);
    let unit = &verdict.units[0];
    assert_eq!(
        unit.result_for(RuleName::ManifestExists, &b.paths().manifest)
            .unwrap()
            .outcome,
        Outcome::NOK
    );
    assert_eq!(unit.results.len(), 1);
}

#[test]
fn unparseable_signature_keeps_its_bytes() {
    let b = minimal();
    let mut entries = b.entries();
    entries.insert(b.paths().signature, b"\x30\x82 binary".to_vec());
    let container = ContainerReader::from_entries(&entries);
    let sig = container.units[0].signature.as_ref().unwrap();
    assert!(sig.bytes.is_some());
    assert!(sig.signed_hash.is_none());

    let verdict = verify(&container);
    let unit = &verdict.units[0];
    assert_eq!(
        unit.result_for(RuleName::SignatureExists, &b.paths().signature)
            .unwrap()
            .outcome,
        Outcome::OK
    );
    assert_eq!(
        unit.result_for(RuleName::SignatureIntegrity, &b.paths().signature)
            .unwrap()
            .outcome,
        Outcome::NOK
    );
}

#[test]
fn missing_marker_is_flagged() {
    let mut entries = minimal().entries();
    entries.remove("mimetype");
    let container = ContainerReader::from_entries(&entries);
    assert!(container.mime_type.is_none());
    let verdict = verify(&container);
    assert_eq!(verdict.container_results[0].rule, RuleName::ContainerMimeType);
    assert_eq!(verdict.container_results[0].outcome, Outcome::NOK);
}
