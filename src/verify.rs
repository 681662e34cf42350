//! The stateless verifier: folds a proof's signed path against a claimed
//! root and reports whether it holds up.

use crate::{
    hashing::HashEngine,
    proof::{
        Proof,
        ValidationStatus,
    },
};

/// Verifies `proof` against `target_root` (the tree's current root hash for
/// an audit proof, or the current root of a consistency proof's tree),
/// mutating `proof.header.status` to record the outcome.
///
/// Both proof kinds share this entrypoint: an audit proof's path folds to
/// `target_root` starting at `body.offset`; a consistency proof's path
/// folds to `target_root` the same way, `body.offset` marking the boundary
/// a caller who also wants to check consistency against a known prior root
/// must pass to [`validate_consistency_proof`], which calls back into this
/// function for the full fold and adds the prior-root check on top.
///
/// Returns `false` outright for a failure proof (no matching leaf or
/// prefix was found at generation time), for a path/engine that doesn't
/// parse, or for a path that folds to something other than `target_root`.
pub fn validate_proof(proof: &mut Proof, target_root: &[u8]) -> bool {
    let verdict = fold_matches(proof, proof.body.offset, proof.body.path.len(), target_root);
    proof.header.status = if verdict {
        ValidationStatus::Valid
    } else {
        ValidationStatus::Invalid
    };
    verdict
}

/// Verifies a consistency proof against both the prior root it claims as a
/// prefix (`old_root`) and the current root of the tree that generated it
/// (`new_root`).
///
/// Reuses the same [`HashEngine::hash_path`] fold [`validate_proof`] runs,
/// twice: once over the full path (matching `new_root`) and once over the
/// path truncated at `body.offset` (matching `old_root`), per the
/// consistency path's two-fold contract (see
/// [`crate::Tree::generate_consistency_proof`]). Does not itself set
/// `proof.header.status` from the full-path check alone — both folds must
/// hold for the proof to be marked valid.
pub fn validate_consistency_proof(proof: &mut Proof, old_root: &[u8], new_root: &[u8]) -> bool {
    let full_ok = fold_matches(proof, proof.body.offset, proof.body.path.len(), new_root);
    let sub_ok = proof.body.offset >= 0 && fold_matches(proof, proof.body.offset, proof.body.offset as usize + 1, old_root);
    let verdict = full_ok && sub_ok;
    proof.header.status = if verdict {
        ValidationStatus::Valid
    } else {
        ValidationStatus::Invalid
    };
    verdict
}

/// Folds `proof.body.path[..path_len]` via `hash_path` starting at `offset`
/// and compares the result to `expected`, in constant time.
fn fold_matches(proof: &Proof, offset: i64, path_len: usize, expected: &[u8]) -> bool {
    if !proof.header.generation || offset < 0 {
        return false;
    }
    let offset = offset as usize;
    if offset >= path_len || path_len > proof.body.path.len() {
        return false;
    }
    let Ok(engine) = HashEngine::from_names(&proof.header.algorithm, &proof.header.encoding, proof.header.security) else {
        return false;
    };
    let Ok(folded) = engine.hash_path(&proof.body.path[..path_len], offset) else {
        return false;
    };
    constant_time_eq(&folded, expected)
}

/// Constant-time byte comparison, so that proof verification does not leak
/// timing information about where a mismatch occurs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0_u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
