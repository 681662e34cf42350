//! An append-only Merkle tree with audit and consistency proofs.
//!
//! Records are accumulated into a tree of perfect subtrees fused
//! right-to-left as they arrive (an "unbalanced-root" tree, in the sense
//! RFC 6962 and pymerkle both use the term): the tree never needs
//! rebalancing, and its root after `n` records is fully determined by the
//! order records were appended in.
//!
//! ```
//! use merkle_audit::{
//!     Tree,
//!     TreeConfig,
//! };
//!
//! let mut tree = Tree::new(TreeConfig::default()).unwrap();
//! tree.append(b"first record");
//! tree.append(b"second record");
//! tree.append(b"third record");
//!
//! let challenge = tree.hash_data(b"second record");
//! let proof = tree.generate_audit_proof(&challenge);
//! assert!(!proof.is_empty());
//! ```
//!
//! # Modules
//! - [`hashing`] — the configurable hash engine (algorithm, text encoding,
//!   and the optional leaf/pair domain-separation prefix).
//! - [`node`] — the arena-backed node graph a [`Tree`] is built from.
//! - [`tree`] — the tree itself: construction, appends, and proof
//!   generation.
//! - [`path`] — audit-path and consistency-path derivation.
//! - [`proof`] — the [`Proof`] object proofs are handed back as.
//! - [`verify`] — the stateless verifier.
//! - [`error`] — typed construction and hashing failures.

pub mod error;
pub mod hashing;
mod node;
mod path;
pub mod proof;
pub mod tree;
pub mod verify;

pub use error::{
    ConfigError,
    HashError,
    TreeError,
};
pub use hashing::{
    Algorithm,
    Encoding,
    HashEngine,
    Sign,
    SignedDigest,
};
pub use proof::{
    Proof,
    ProofBody,
    ProofHeader,
    ValidationStatus,
};
pub use tree::{
    Tree,
    TreeConfig,
};
pub use verify::{
    validate_consistency_proof,
    validate_proof,
};
