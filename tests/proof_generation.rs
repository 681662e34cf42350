//! Audit- and consistency-proof generation and verification, ported from
//! `tests/tree/test_proof_generation.py` in the pymerkle project this
//! crate's tree is grounded on.

use merkle_audit::{
    hashing::{
        Algorithm,
        Encoding,
    },
    Tree,
    TreeConfig,
};

const RECORDS: [&[u8]; 6] = [b"0-th record", b"1-th record", b"2-th record", b"3-th record", b"4-th record", b"5-th record"];

fn tree_of_length(n: usize) -> Tree {
    Tree::init_from_records(TreeConfig::default(), RECORDS[..n].iter().copied()).unwrap()
}

#[test]
fn audit_proof_for_a_wrong_challenge_is_a_failure_proof() {
    for n in 0..=RECORDS.len() {
        let tree = tree_of_length(n);
        let proof = tree.generate_audit_proof(&tree.hash_data(b"anything that has not been recorded"));

        assert!(!proof.header.generation);
        assert_eq!(proof.body.offset, -1);
        assert!(proof.is_empty());
    }
}

#[test]
fn audit_proof_for_every_recorded_leaf_verifies() {
    for n in 1..=RECORDS.len() {
        let tree = tree_of_length(n);
        let root = tree.root_hash().unwrap();
        for record in &RECORDS[..n] {
            let mut proof = tree.generate_audit_proof(&tree.hash_data(record));
            assert!(proof.header.generation);
            assert!(!proof.is_empty());
            assert!(merkle_audit::validate_proof(&mut proof, &root));
            assert_eq!(proof.header.status, merkle_audit::ValidationStatus::Valid);
        }
    }
}

#[test]
fn audit_proof_does_not_verify_against_a_foreign_root() {
    let tree = tree_of_length(4);
    let other = tree_of_length(3);

    let mut proof = tree.generate_audit_proof(&tree.hash_data(RECORDS[0]));
    assert!(!merkle_audit::validate_proof(&mut proof, &other.root_hash().unwrap()));
    assert_eq!(proof.header.status, merkle_audit::ValidationStatus::Invalid);
}

#[test]
fn consistency_proof_for_every_prefix_length_verifies() {
    for n in 1..=RECORDS.len() {
        let tree = tree_of_length(n);
        let new_root = tree.root_hash().unwrap();

        for m in 1..=n {
            let subtree = tree_of_length(m);
            let old_root = subtree.root_hash().unwrap();

            let mut proof = tree.generate_consistency_proof(&old_root);
            assert!(proof.header.generation, "n={n} m={m}");
            assert!(
                merkle_audit::validate_consistency_proof(&mut proof, &old_root, &new_root),
                "n={n} m={m}"
            );
        }
    }
}

#[test]
fn consistency_proof_for_a_wrong_challenge_is_a_failure_proof() {
    let tree = tree_of_length(4);
    let proof = tree.generate_consistency_proof(b"anything that has not been recorded");

    assert!(!proof.header.generation);
    assert_eq!(proof.body.offset, -1);
    assert!(proof.is_empty());
}

#[test]
fn consistency_proof_rejects_a_divergent_history() {
    // Same length, same prefix-sized commitment requested, but the two trees
    // diverge at a record within that prefix: the consistency proof must not
    // verify even though an earlier root of *some* tree is being presented.
    let honest_records: [&[u8]; 4] = [b"a", b"b", b"c", b"d"];
    let divergent_records: [&[u8]; 4] = [b"a", b"X", b"c", b"d"];
    let prefix_records: [&[u8]; 2] = [b"a", b"b"];

    let honest = Tree::init_from_records(TreeConfig::default(), honest_records).unwrap();
    let divergent = Tree::init_from_records(TreeConfig::default(), divergent_records).unwrap();

    let old_root = Tree::init_from_records(TreeConfig::default(), prefix_records).unwrap().root_hash().unwrap();

    let mut proof = divergent.generate_consistency_proof(&old_root);
    // The divergent tree's own 2-record prefix root differs from `old_root`,
    // so it cannot even produce a non-failure proof for this challenge.
    assert!(proof.is_empty());

    let new_root = divergent.root_hash().unwrap();
    assert!(!merkle_audit::validate_consistency_proof(&mut proof, &old_root, &new_root));

    // Sanity: the honest tree's matching prefix does verify.
    let mut honest_proof = honest.generate_consistency_proof(&old_root);
    assert!(merkle_audit::validate_consistency_proof(
        &mut honest_proof,
        &old_root,
        &honest.root_hash().unwrap()
    ));
}

#[test]
fn length_size_and_height_track_the_append_count() {
    for n in 0..=RECORDS.len() {
        let tree = tree_of_length(n);
        assert_eq!(tree.length(), n);
        assert_eq!(tree.size(), if n == 0 { 0 } else { 2 * n - 1 });
        let expected_height = if n <= 1 { 0 } else { (usize::BITS - (n - 1).leading_zeros()) };
        assert_eq!(tree.height(), expected_height, "n={n}");
    }
}

#[test]
fn non_sha256_algorithms_and_encodings_produce_verifiable_proofs() {
    let configs = [
        (Algorithm::Sha224, Encoding::Utf8),
        (Algorithm::Sha384, Encoding::Ascii),
        (Algorithm::Sha512, Encoding::Latin1),
        (Algorithm::Sha3_256, Encoding::Utf16),
        (Algorithm::Sha3_512, Encoding::Utf32),
    ];

    for (algorithm, encoding) in configs {
        let config = TreeConfig {
            algorithm,
            encoding,
            security: true,
        };
        let tree = Tree::init_from_records(config, RECORDS).unwrap();
        let root = tree.root_hash().unwrap();

        let mut proof = tree.generate_audit_proof(&tree.hash_data(RECORDS[3]));
        assert!(merkle_audit::validate_proof(&mut proof, &root), "{algorithm:?}/{encoding:?}");
    }
}

#[cfg(feature = "serde")]
#[test]
fn proof_json_round_trip_verifies_identically() {
    let tree = tree_of_length(5);
    let root = tree.root_hash().unwrap();
    let mut proof = tree.generate_audit_proof(&tree.hash_data(RECORDS[2]));
    assert!(merkle_audit::validate_proof(&mut proof, &root));

    let json = serde_json::to_string(&proof).unwrap();
    let mut restored: merkle_audit::Proof = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.body.offset, proof.body.offset);
    assert_eq!(restored.body.path.len(), proof.body.path.len());
    assert!(merkle_audit::validate_proof(&mut restored, &root));

    let rejson = serde_json::to_string(&restored).unwrap();
    assert_eq!(json, rejson);
}

#[cfg(feature = "serde")]
#[test]
fn failure_proof_round_trips_too() {
    let tree = tree_of_length(3);
    let mut proof = tree.generate_audit_proof(&tree.hash_data(b"never recorded"));

    let json = serde_json::to_string(&proof).unwrap();
    let restored: merkle_audit::Proof = serde_json::from_str(&json).unwrap();
    assert!(restored.is_empty());
    assert_eq!(restored.body.offset, -1);

    assert!(!merkle_audit::validate_proof(&mut proof, &tree.root_hash().unwrap()));
}
