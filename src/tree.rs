//! The tree skeleton: an append-only Merkle tree built from perfect
//! subtrees fused right-to-left as records arrive, generalizing the
//! flat-array `Tree` this crate grew out of to an arena-backed node graph.

use tracing::{
    debug,
    trace,
};
use uuid::Uuid;

use crate::{
    error::TreeError,
    hashing::{
        Algorithm,
        Encoding,
        HashEngine,
    },
    node::{
        NodeArena,
        NodeId,
    },
    path,
    proof::Proof,
};

/// Construction parameters for a [`Tree`], mirroring pymerkle's
/// `config = {'algorithm': ..., 'encoding': ..., 'security': ...}`.
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    pub algorithm: Algorithm,
    pub encoding: Encoding,
    pub security: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha256,
            encoding: Encoding::Utf8,
            security: true,
        }
    }
}

/// An append-only Merkle tree.
///
/// Appending a record only touches the nodes along the current right spine
/// of perfect subtrees (`O(log n)` amortized, like a binary counter); the
/// tree never stores or re-derives leaf positions that have already settled
/// into a completed perfect subtree.
pub struct Tree {
    engine: HashEngine,
    arena: NodeArena,
    leaves: Vec<NodeId>,
    /// Perfect subtree peaks, ordered left-to-right (earliest/largest
    /// first), each entry holding `(height, root)` with `height` the
    /// subtree's `log2(size)`.
    peaks: Vec<(u32, NodeId)>,
    provider: Uuid,
}

impl Tree {
    /// Creates an empty tree under the given configuration.
    pub fn new(config: TreeConfig) -> Result<Self, TreeError> {
        let engine = HashEngine::try_new(config.algorithm, config.encoding, config.security)?;
        Ok(Self {
            engine,
            arena: NodeArena::new(),
            leaves: Vec::new(),
            peaks: Vec::new(),
            provider: Uuid::new_v4(),
        })
    }

    /// Builds a tree by appending `records` in order.
    pub fn init_from_records<I, R>(config: TreeConfig, records: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        let mut tree = Self::new(config)?;
        for record in records {
            tree.append(record.as_ref());
        }
        Ok(tree)
    }

    #[must_use]
    pub fn provider(&self) -> Uuid {
        self.provider
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.engine.algorithm()
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.engine.encoding()
    }

    #[must_use]
    pub fn security(&self) -> bool {
        self.engine.security()
    }

    /// The number of leaves (records) the tree currently holds.
    #[must_use]
    pub fn length(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The total number of nodes (leaves plus interior nodes) the tree
    /// holds: `2 * length() - 1` for a non-empty tree, since every interior
    /// node has exactly two children.
    #[must_use]
    pub fn size(&self) -> usize {
        let n = self.length();
        if n == 0 {
            0
        } else {
            2 * n - 1
        }
    }

    /// The height of the tree: `0` for an empty or single-leaf tree,
    /// otherwise `⌈log2(length)⌉`.
    ///
    /// This is not simply the height of the tallest perfect subtree
    /// (`self.peaks[0]`): when `length` is not a power of two the
    /// right-spine peaks are themselves combined one more level for every
    /// additional peak beyond the first two, so the overall height has to
    /// be derived from `length` directly rather than read off the peak
    /// stack.
    #[must_use]
    pub fn height(&self) -> u32 {
        let n = self.length();
        if n <= 1 {
            0
        } else {
            usize::BITS - (n - 1).leading_zeros()
        }
    }

    /// Hashes `data` under this tree's configured engine, without appending
    /// it. Matches pymerkle's standalone `hash_data` convenience.
    #[must_use]
    pub fn hash_data(&self, data: &[u8]) -> Vec<u8> {
        self.engine.hash_data(data)
    }

    /// Appends a new record, updating the right spine of perfect subtrees.
    pub fn append(&mut self, data: &[u8]) {
        trace!(length = self.leaves.len(), "appending record to tree");
        let leaf = self.arena.insert_leaf_from_data(&self.engine, data);
        if let Some(&previous) = self.leaves.last() {
            self.arena.link_leaf_chain(previous, leaf);
        }
        self.leaves.push(leaf);
        self.peaks.push((0, leaf));

        while self.peaks.len() >= 2 {
            let top = self.peaks.len() - 1;
            if self.peaks[top].0 != self.peaks[top - 1].0 {
                break;
            }
            let (height, right) = self.peaks.pop().expect("checked len >= 2");
            let (_, left) = self.peaks.pop().expect("checked len >= 2");
            let fused = self.arena.insert_from_children(&self.engine, left, right);
            self.peaks.push((height + 1, fused));
        }
        debug!(length = self.leaves.len(), peaks = self.peaks.len(), "tree updated");
    }

    /// Returns the current root hash.
    pub fn root_hash(&self) -> Result<Vec<u8>, TreeError> {
        let mut iter = self.peaks.iter().rev();
        let (_, last) = iter.next().ok_or(TreeError::EmptyTree)?;
        let mut acc = self.arena.get(*last).digest().to_vec();
        for (_, id) in iter {
            let left = self.arena.get(*id).digest();
            acc = self.engine.hash_pair(left, &acc);
        }
        Ok(acc)
    }

    fn leaf_digests(&self) -> Vec<Vec<u8>> {
        self.leaves.iter().map(|&id| self.arena.get(id).digest().to_vec()).collect()
    }

    /// Generates an audit (inclusion) proof for `challenge`, the digest of a
    /// previously recorded entry (i.e. `self.hash_data(record)`, not the raw
    /// record bytes).
    ///
    /// If no recorded leaf's digest equals `challenge`, returns a failure
    /// proof with an empty path and an offset of `-1`, matching pymerkle's
    /// `generate_audit_proof` behavior for an unrecognized challenge.
    #[must_use]
    pub fn generate_audit_proof(&self, challenge: &[u8]) -> Proof {
        debug!("generating audit proof");
        let leaves = self.leaf_digests();
        let Some(index) = leaves.iter().position(|digest| digest.as_slice() == challenge) else {
            return Proof::failure(&self.engine, self.provider);
        };
        let (offset, path) = path::audit_path(&self.engine, &leaves, index);
        Proof::success(&self.engine, self.provider, offset as i64, path)
    }

    /// Generates a consistency proof that `challenge`, the root hash of an
    /// earlier state of this tree, is a genuine prefix commitment of the
    /// current state.
    ///
    /// The returned proof's path folds to the current root via
    /// [`crate::hashing::HashEngine::hash_path`] starting at `body.offset`,
    /// the same contract an audit proof's path satisfies; truncating the
    /// path to `body.offset` and folding again reproduces `challenge`
    /// itself, which is how [`crate::validate_consistency_proof`] checks it.
    ///
    /// If no prefix length produces `challenge` as its root, returns a
    /// failure proof with an empty path and an offset of `-1`.
    #[must_use]
    pub fn generate_consistency_proof(&self, challenge: &[u8]) -> Proof {
        debug!("generating consistency proof");
        let leaves = self.leaf_digests();
        let Some(m) = path::find_prefix_length(&self.engine, &leaves, challenge) else {
            return Proof::failure(&self.engine, self.provider);
        };
        let (offset, path) = path::consistency_path(&self.engine, &leaves, m);
        Proof::success(&self.engine, self.provider, offset as i64, path)
    }
}
