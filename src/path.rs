//! Audit-path and consistency-path derivation.
//!
//! Both algorithms share the same recursive decomposition pymerkle's
//! `utils.powers_of` describes: a tree (or subtree) over `n` leaves splits
//! at `k`, the largest power of two strictly less than `n`, into a perfect
//! left subtree of `k` leaves and a (possibly imperfect) right subtree of
//! `n - k` leaves. Both path kinds walk that split recursively, differing
//! only in what they're looking for: a single leaf position (audit) or an
//! exact prefix length (consistency).

use std::collections::VecDeque;

use crate::hashing::{
    HashEngine,
    Sign,
    SignedDigest,
};

/// The largest power of two strictly less than `n`. Undefined for `n <= 1`.
pub(crate) fn split_point(n: usize) -> usize {
    let mut k = 1;
    while k * 2 < n {
        k *= 2;
    }
    k
}

/// Recomputes the digest that a subtree holding exactly `leaves` would have,
/// from scratch. Returns the digest of the empty string for an empty slice,
/// matching `Tree::root_hash`'s definition for an empty tree.
pub(crate) fn subtree_root(engine: &HashEngine, leaves: &[Vec<u8>]) -> Vec<u8> {
    match leaves.len() {
        0 => engine.hash_data(b""),
        1 => leaves[0].clone(),
        n => {
            let k = split_point(n);
            let left = subtree_root(engine, &leaves[..k]);
            let right = subtree_root(engine, &leaves[k..]);
            engine.hash_pair(&left, &right)
        }
    }
}

/// Derives the audit path for the leaf at `index`, including the leaf's own
/// digest, and the offset within that path where it sits. Folding the
/// returned path through [`HashEngine::hash_path`] starting at that offset
/// reproduces the tree's root digest.
///
/// Recurses on the same left/right split as [`subtree_root`], threading
/// `own_sign` down so that the base case (a single-leaf subtree) knows which
/// sign to tag the leaf's digest with: descending into the left subtree
/// fixes it to [`Sign::Plus`], the right to [`Sign::Minus`], matching the
/// role that subtree's root would play in a fold against its sibling.
/// Climbing back up, a left descent appends the (untouched) right subtree's
/// root to the path; a right descent prepends the left subtree's root and
/// shifts the offset over by one to account for it.
pub(crate) fn audit_path(engine: &HashEngine, leaves: &[Vec<u8>], index: usize) -> (usize, Vec<SignedDigest>) {
    fn go(engine: &HashEngine, leaves: &[Vec<u8>], index: usize, own_sign: Sign) -> (usize, VecDeque<SignedDigest>) {
        let n = leaves.len();
        if n <= 1 {
            return (0, VecDeque::from([SignedDigest::new(own_sign, leaves[0].clone())]));
        }
        let k = split_point(n);
        if index < k {
            let (offset, mut path) = go(engine, &leaves[..k], index, Sign::Plus);
            let right = subtree_root(engine, &leaves[k..]);
            path.push_back(SignedDigest::new(Sign::Plus, right));
            (offset, path)
        } else {
            let (offset, mut path) = go(engine, &leaves[k..], index - k, Sign::Minus);
            let left = subtree_root(engine, &leaves[..k]);
            path.push_front(SignedDigest::new(Sign::Minus, left));
            (offset + 1, path)
        }
    }
    let (offset, path) = go(engine, leaves, index, Sign::Plus);
    (offset, path.into_iter().collect())
}

/// Derives the consistency path proving that the first `m` leaves' subtree
/// root is a "prefix commitment" of the full `leaves` tree, together with
/// the offset within that path that marks the boundary.
///
/// Structurally identical to [`audit_path`], with the leaf lookup replaced
/// by a lookup for the prefix boundary `m == n`: descending left fixes the
/// eventual boundary item to [`Sign::Plus`], descending right to
/// [`Sign::Minus`], exactly as audit_path's leaf search does. The returned
/// `offset` serves two folds: `hash_path(&path, offset)` reproduces the
/// full tree's root, and `hash_path(&path[..=offset], offset)` reproduces
/// the root of the first `m` leaves — the prior commitment being proven
/// consistent.
pub(crate) fn consistency_path(engine: &HashEngine, leaves: &[Vec<u8>], m: usize) -> (usize, Vec<SignedDigest>) {
    fn go(engine: &HashEngine, leaves: &[Vec<u8>], m: usize, own_sign: Sign) -> (usize, VecDeque<SignedDigest>) {
        let n = leaves.len();
        if m == n {
            return (0, VecDeque::from([SignedDigest::new(own_sign, subtree_root(engine, leaves))]));
        }
        let k = split_point(n);
        if m <= k {
            let (offset, mut path) = go(engine, &leaves[..k], m, Sign::Plus);
            let right = subtree_root(engine, &leaves[k..]);
            path.push_back(SignedDigest::new(Sign::Plus, right));
            (offset, path)
        } else {
            let (offset, mut path) = go(engine, &leaves[k..], m - k, Sign::Minus);
            let left = subtree_root(engine, &leaves[..k]);
            path.push_front(SignedDigest::new(Sign::Minus, left));
            (offset + 1, path)
        }
    }
    let (offset, path) = go(engine, leaves, m, Sign::Plus);
    (offset, path.into_iter().collect())
}

/// Finds the smallest `m` in `1..=leaves.len()` whose subtree root equals
/// `challenge`, scanning candidates in increasing order (spec's adopted
/// tie-break for consistency-proof generation).
pub(crate) fn find_prefix_length(engine: &HashEngine, leaves: &[Vec<u8>], challenge: &[u8]) -> Option<usize> {
    (1..=leaves.len()).find(|&m| subtree_root(engine, &leaves[..m]) == challenge)
}
