use envelope_core::error::{CoreError, CoreResult};
use envelope_core::hashing::{
    AlgorithmStatus, DefaultAlgorithmRegistry, FileReference, HashAlgorithm,
    HashAlgorithmRegistry, HashEntry, MultiHashElement, Payload,
};
use envelope_core::rules::hash_trust::{verify_reference, ReferenceVerdict};
use envelope_core::rules::{RuleContext, RuleName};
use envelope_core::signature::Ed25519DetachedVerifier;
use envelope_core::verification::{Outcome, ResultHolder, RuleState, Scope};
use proptest::prelude::*;
use std::cell::Cell;

/// Element that counts how often its digest is requested.
struct CountingElement {
    path: String,
    bytes: Vec<u8>,
    calls: Cell<usize>,
}

impl CountingElement {
    fn new(path: &str, bytes: &[u8]) -> Self {
        Self {
            path: path.to_string(),
            bytes: bytes.to_vec(),
            calls: Cell::new(0),
        }
    }
}

impl MultiHashElement for CountingElement {
    fn element_path(&self) -> &str {
        &self.path
    }

    fn data_hash(&self, algorithm: HashAlgorithm) -> CoreResult<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(algorithm.digest_hex(&self.bytes))
    }
}

struct FileElement {
    path: String,
    payload: Payload,
}

impl MultiHashElement for FileElement {
    fn element_path(&self) -> &str {
        &self.path
    }

    fn data_hash(&self, algorithm: HashAlgorithm) -> CoreResult<String> {
        self.payload.digest_hex(algorithm)
    }
}

/// Treats every computable algorithm as trusted.
struct PermissiveRegistry;

impl HashAlgorithmRegistry for PermissiveRegistry {
    fn status(&self, algorithm: &str) -> AlgorithmStatus {
        match HashAlgorithm::from_id(algorithm) {
            Some(_) => AlgorithmStatus::NORMAL,
            None => AlgorithmStatus::NOT_IMPLEMENTED,
        }
    }
}

fn run(
    registry: &dyn HashAlgorithmRegistry,
    state: RuleState,
    element: &dyn MultiHashElement,
    reference: &FileReference,
) -> (ReferenceVerdict, ResultHolder) {
    let verifier = Ed25519DetachedVerifier::new(vec![]);
    let ctx = RuleContext {
        scope: Scope::Unit(0),
        registry,
        signatures: &verifier,
    };
    let mut holder = ResultHolder::new();
    let verdict = verify_reference(&ctx, &mut holder, state, element, reference);
    (verdict, holder)
}

fn reference(entries: Vec<HashEntry>) -> FileReference {
    FileReference::new("data.bin", "application/octet-stream", entries).unwrap()
}

fn rules_recorded(holder: &ResultHolder) -> Vec<(RuleName, Outcome)> {
    holder
        .results(&Scope::Unit(0))
        .iter()
        .map(|r| (r.rule, r.outcome))
        .collect()
}

#[test]
fn unimplemented_algorithm_short_circuits_before_hashing() {
    let registry = DefaultAlgorithmRegistry::v1().unwrap();
    let element = CountingElement::new("data.bin", b"payload");
    let r = reference(vec![HashEntry::new("WHIRLPOOL", "00")]);
    let (verdict, holder) = run(&registry, RuleState::FAIL, &element, &r);

    assert_eq!(
        rules_recorded(&holder),
        vec![(RuleName::HashAlgorithmImplemented, Outcome::NOK)]
    );
    assert!(matches!(
        verdict,
        ReferenceVerdict::Failed { primitive: RuleName::HashAlgorithmImplemented, .. }
    ));
    assert_eq!(element.calls.get(), 0);
}

#[test]
fn sha1_only_reference_is_not_trusted() {
    let registry = DefaultAlgorithmRegistry::v1().unwrap();
    let element = CountingElement::new("data.bin", b"payload");
    let digest = HashAlgorithm::SHA1.digest_hex(b"payload");
    let r = reference(vec![HashEntry::new("SHA-1", digest)]);
    let (_, holder) = run(&registry, RuleState::FAIL, &element, &r);

    assert_eq!(
        rules_recorded(&holder),
        vec![
            (RuleName::HashAlgorithmImplemented, Outcome::OK),
            (RuleName::HashAlgorithmTrusted, Outcome::NOK),
        ]
    );
    assert_eq!(element.calls.get(), 0);
}

#[test]
fn one_trusted_algorithm_is_enough_but_every_digest_must_match() {
    let registry = DefaultAlgorithmRegistry::v1().unwrap();
    let element = CountingElement::new("data.bin", b"payload");
    let good = reference(vec![
        HashEntry::new("SHA-1", HashAlgorithm::SHA1.digest_hex(b"payload")),
        HashEntry::new("SHA-256", HashAlgorithm::SHA256.digest_hex(b"payload")),
    ]);
    let (verdict, holder) = run(&registry, RuleState::FAIL, &element, &good);
    assert_eq!(verdict, ReferenceVerdict::Trusted);
    assert_eq!(
        rules_recorded(&holder),
        vec![
            (RuleName::HashAlgorithmImplemented, Outcome::OK),
            (RuleName::HashAlgorithmTrusted, Outcome::OK),
            (RuleName::HashDigestMatch, Outcome::OK),
        ]
    );

    let bad = reference(vec![
        HashEntry::new("SHA-1", "00".repeat(20)),
        HashEntry::new("SHA-256", HashAlgorithm::SHA256.digest_hex(b"payload")),
    ]);
    let (verdict, holder) = run(&registry, RuleState::FAIL, &element, &bad);
    assert!(matches!(
        verdict,
        ReferenceVerdict::Failed { primitive: RuleName::HashDigestMatch, .. }
    ));
    assert_eq!(
        holder.filtered_aggregated_result(
            &Scope::Unit(0),
            |r| r.rule == RuleName::HashDigestMatch,
            None
        ),
        Outcome::NOK
    );
}

#[test]
fn warn_state_records_the_failure_and_stops_the_chain() {
    let registry = DefaultAlgorithmRegistry::v1().unwrap();
    let element = CountingElement::new("data.bin", b"payload");
    let r = reference(vec![HashEntry::new(
        "SHA-1",
        HashAlgorithm::SHA1.digest_hex(b"payload"),
    )]);
    let (verdict, holder) = run(&registry, RuleState::WARN, &element, &r);

    assert_eq!(
        rules_recorded(&holder),
        vec![
            (RuleName::HashAlgorithmImplemented, Outcome::OK),
            (RuleName::HashAlgorithmTrusted, Outcome::WARN),
        ]
    );
    assert!(matches!(
        verdict,
        ReferenceVerdict::Failed { primitive: RuleName::HashAlgorithmTrusted, .. }
    ));
    assert_eq!(element.calls.get(), 0);
}

#[test]
fn unimplemented_algorithm_at_warn_reports_once() {
    let registry = DefaultAlgorithmRegistry::v1().unwrap();
    let element = CountingElement::new("data.bin", b"payload");
    let r = reference(vec![HashEntry::new("WHIRLPOOL", "00")]);
    let (verdict, holder) = run(&registry, RuleState::WARN, &element, &r);

    assert_eq!(
        rules_recorded(&holder),
        vec![(RuleName::HashAlgorithmImplemented, Outcome::WARN)]
    );
    assert!(matches!(
        verdict,
        ReferenceVerdict::Failed { primitive: RuleName::HashAlgorithmImplemented, .. }
    ));
    assert_eq!(element.calls.get(), 0);
}

#[test]
fn unimplemented_algorithm_at_ignore_records_nothing() {
    let registry = DefaultAlgorithmRegistry::v1().unwrap();
    let element = CountingElement::new("data.bin", b"payload");
    let r = reference(vec![HashEntry::new("WHIRLPOOL", "00")]);
    let (verdict, holder) = run(&registry, RuleState::IGNORE, &element, &r);

    assert!(rules_recorded(&holder).is_empty());
    assert!(matches!(verdict, ReferenceVerdict::Failed { .. }));
    assert_eq!(element.calls.get(), 0);
}

#[test]
fn ignore_state_drops_failures_but_keeps_passes() {
    let registry = DefaultAlgorithmRegistry::v1().unwrap();
    let element = CountingElement::new("data.bin", b"payload");
    let r = reference(vec![HashEntry::new("SHA-256", "00".repeat(32))]);
    let (_, holder) = run(&registry, RuleState::IGNORE, &element, &r);

    assert_eq!(
        rules_recorded(&holder),
        vec![
            (RuleName::HashAlgorithmImplemented, Outcome::OK),
            (RuleName::HashAlgorithmTrusted, Outcome::OK),
        ]
    );
}

#[test]
fn unreadable_payload_attaches_io_cause() {
    let dir = tempfile::tempdir().unwrap();
    let element = FileElement {
        path: "data.bin".to_string(),
        payload: Payload::File(dir.path().join("gone.bin")),
    };
    assert!(matches!(
        element.data_hash(HashAlgorithm::SHA256),
        Err(CoreError::Io(_))
    ));

    let registry = DefaultAlgorithmRegistry::v1().unwrap();
    let r = reference(vec![HashEntry::new("SHA-256", "00".repeat(32))]);
    let (_, holder) = run(&registry, RuleState::FAIL, &element, &r);
    let last = holder.results(&Scope::Unit(0)).last().unwrap();
    assert_eq!(last.rule, RuleName::HashDigestMatch);
    assert_eq!(last.outcome, Outcome::NOK);
    assert!(last.cause.is_some());
}

#[test]
fn file_payload_digests_like_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    std::fs::write(&path, b"streamed content").unwrap();
    for alg in HashAlgorithm::ALL {
        assert_eq!(
            Payload::File(path.clone()).digest_hex(alg).unwrap(),
            Payload::Bytes(b"streamed content".to_vec())
                .digest_hex(alg)
                .unwrap()
        );
    }
}

proptest! {
    #[test]
    fn digest_is_deterministic_and_self_verifying(
        bytes in proptest::collection::vec(any::<u8>(), 0..512),
        idx in 0usize..HashAlgorithm::ALL.len(),
    ) {
        let alg = HashAlgorithm::ALL[idx];
        let element = CountingElement::new("data.bin", &bytes);
        let first = element.data_hash(alg).unwrap();
        prop_assert_eq!(&first, &element.data_hash(alg).unwrap());

        let r = reference(vec![HashEntry::new(alg.id(), first)]);
        let (verdict, _) = run(&PermissiveRegistry, RuleState::FAIL, &element, &r);
        prop_assert_eq!(verdict, ReferenceVerdict::Trusted);
    }
}
