//! Typed failure conditions.
//!
//! A failed audit or consistency challenge is not an error: it is represented
//! as a [`crate::Proof`] carrying an empty path and an offset of `-1`, and a
//! failed verification is a `bool` returned by [`crate::verify::validate_proof`].
//! The types here cover everything that *is* fatal to the caller: bad
//! construction parameters, and the handful of structural invariants the
//! hash engine and tree rely on.

use thiserror::Error;

/// Returned when a [`crate::HashEngine`] or [`crate::TreeConfig`] is
/// constructed with a hash algorithm or text encoding this crate does not
/// implement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("unsupported text encoding: {0}")]
    UnsupportedEncoding(String),
}

/// Errors raised while folding or deriving hash paths.
#[derive(Debug, Error)]
pub enum HashError {
    /// [`crate::HashEngine::hash_path`] was called with no path elements.
    #[error("cannot fold an empty hash path")]
    EmptyPath,
    #[error("i/o error while hashing file")]
    Io(#[from] std::io::Error),
}

/// Errors raised by [`crate::Tree`] operations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The tree has no leaves, so it has no root hash.
    #[error("merkle tree is empty")]
    EmptyTree,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Hash(#[from] HashError),
}
