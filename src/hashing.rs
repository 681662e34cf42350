//! The hash engine: domain-separated digests over a configurable algorithm
//! and text encoding.
//!
//! Mirrors `SHA256(0x00 || leaf)` / `SHA256(0x01 || left || right)` from the
//! flat-array tree this crate grew out of, generalized to a family of digest
//! algorithms and to an optional "security" mode that can be switched off to
//! get plain, non-domain-separated hashing (useful for interop with trees
//! that were never built with second-preimage resistance in mind).

use std::{
    fs::File,
    io::Read as _,
    path::Path,
};

use sha2::{
    Digest,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
};
use sha3::{
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
};

use crate::error::{
    ConfigError,
    HashError,
};

const LEAF_PREFIX: u32 = 0x00;
const PAIR_PREFIX: u32 = 0x01;

/// A supported digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Algorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl Algorithm {
    /// Returns the digest size, in bytes, produced by this algorithm.
    #[must_use]
    pub fn output_size(self) -> usize {
        match self {
            Algorithm::Sha224 | Algorithm::Sha3_224 => 28,
            Algorithm::Sha256 | Algorithm::Sha3_256 => 32,
            Algorithm::Sha384 | Algorithm::Sha3_384 => 48,
            Algorithm::Sha512 | Algorithm::Sha3_512 => 64,
        }
    }

    /// The lowercase name used in configuration and proof headers, e.g.
    /// `"sha256"`, `"sha3_256"` — matching the `sha3_*` spelling pymerkle
    /// and `hashlib` use, not a hyphenated one.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
            Algorithm::Sha3_224 => "sha3_224",
            Algorithm::Sha3_256 => "sha3_256",
            Algorithm::Sha3_384 => "sha3_384",
            Algorithm::Sha3_512 => "sha3_512",
        }
    }

    fn from_name(name: &str) -> Result<Self, ConfigError> {
        supported_algorithms()
            .iter()
            .copied()
            .find(|algorithm| algorithm.name() == name)
            .ok_or_else(|| ConfigError::UnsupportedAlgorithm(name.to_owned()))
    }
}

/// All algorithms this crate knows how to dispatch to.
#[must_use]
pub fn supported_algorithms() -> &'static [Algorithm] {
    &[
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Sha3_224,
        Algorithm::Sha3_256,
        Algorithm::Sha3_384,
        Algorithm::Sha3_512,
    ]
}

/// A supported text encoding for record bytes and domain-separation
/// prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Encoding {
    Utf8,
    Utf16,
    Utf32,
    Ascii,
    Latin1,
}

impl Encoding {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16 => "utf-16",
            Encoding::Utf32 => "utf-32",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin-1",
        }
    }

    pub(crate) fn from_name(name: &str) -> Result<Self, ConfigError> {
        supported_encodings()
            .iter()
            .copied()
            .find(|encoding| encoding.name() == name)
            .ok_or_else(|| ConfigError::UnsupportedEncoding(name.to_owned()))
    }

    /// Re-encodes a raw Unicode code point as this encoding's byte layout.
    ///
    /// Used to serialize the `0x00`/`0x01` domain-separation prefixes
    /// consistently with whatever encoding the record bytes are assumed to
    /// be in, so that e.g. a UTF-16 tree's leaf prefix is two bytes wide,
    /// not one.
    fn encode_prefix(self, code_point: u32) -> Vec<u8> {
        let ch = char::from_u32(code_point).expect("domain-separation prefixes are valid code points");
        self.encode_text(&ch.to_string())
    }

    /// Re-encodes `text` as this encoding's byte layout.
    ///
    /// Digests are carried around as the lowercase hex text of the
    /// underlying cryptographic hash, itself encoded this way: a SHA-256
    /// digest under `Utf16` is 128 bytes (64 hex characters, 2 bytes each),
    /// not the raw 32-byte hash.
    #[must_use]
    pub fn encode_text(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 | Encoding::Ascii | Encoding::Latin1 => text.as_bytes().to_vec(),
            Encoding::Utf16 => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Encoding::Utf32 => text.chars().flat_map(|c| (c as u32).to_le_bytes()).collect(),
        }
    }

    /// Reverses [`Self::encode_text`], returning `None` if `bytes` is not a
    /// valid encoding of text under `self`.
    pub(crate) fn decode_text(self, bytes: &[u8]) -> Option<String> {
        match self {
            Encoding::Utf8 | Encoding::Ascii | Encoding::Latin1 => String::from_utf8(bytes.to_vec()).ok(),
            Encoding::Utf16 => {
                let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
                String::from_utf16(&units).ok()
            }
            Encoding::Utf32 => bytes
                .chunks_exact(4)
                .map(|c| char::from_u32(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
                .collect(),
        }
    }
}

/// All encodings this crate knows how to apply.
#[must_use]
pub fn supported_encodings() -> &'static [Encoding] {
    &[
        Encoding::Utf8,
        Encoding::Utf16,
        Encoding::Utf32,
        Encoding::Ascii,
        Encoding::Latin1,
    ]
}

/// The sign tag attached to a sibling digest inside an audit or consistency
/// path, recording which side of the next fold step it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// The digest is combined as the left operand of the next fold.
    Plus,
    /// The digest is combined as the right operand of the next fold.
    Minus,
}

/// A single digest tagged with its folding role inside a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDigest {
    pub sign: Sign,
    pub digest: Vec<u8>,
}

impl SignedDigest {
    #[must_use]
    pub fn new(sign: Sign, digest: Vec<u8>) -> Self {
        Self {
            sign,
            digest,
        }
    }
}

/// A configurable, stateless hashing engine.
///
/// A `HashEngine` can be used independently of a [`crate::Tree`]: it is the
/// same standalone object pymerkle exposes for computing leaf and pair
/// digests ahead of constructing (or outside of) a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEngine {
    algorithm: Algorithm,
    encoding: Encoding,
    security: bool,
}

impl HashEngine {
    /// Constructs an engine, validating `algorithm` and `encoding` against
    /// the supported sets.
    pub fn try_new(algorithm: Algorithm, encoding: Encoding, security: bool) -> Result<Self, ConfigError> {
        if !supported_algorithms().contains(&algorithm) {
            return Err(ConfigError::UnsupportedAlgorithm(algorithm.name().to_owned()));
        }
        if !supported_encodings().contains(&encoding) {
            return Err(ConfigError::UnsupportedEncoding(encoding.name().to_owned()));
        }
        Ok(Self {
            algorithm,
            encoding,
            security,
        })
    }

    /// Parses an engine out of its algorithm/encoding names, as they would
    /// appear in a serialized proof header or a configuration map.
    pub fn from_names(algorithm: &str, encoding: &str, security: bool) -> Result<Self, ConfigError> {
        Self::try_new(Algorithm::from_name(algorithm)?, Encoding::from_name(encoding)?, security)
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[must_use]
    pub fn security(&self) -> bool {
        self.security
    }

    /// Computes the raw cryptographic digest of `chunks`, then re-encodes it
    /// as lowercase hex text under `self.encoding`.
    ///
    /// A [`Digest`](https://en.wikipedia.org/wiki/Cryptographic_hash_function)
    /// in this crate is always this hex text, not the raw hash output: it is
    /// what gets fed back into `hash_pair` at the next tree level, so digests
    /// compound as text, not as bytes.
    fn digest(&self, chunks: &[&[u8]]) -> Vec<u8> {
        macro_rules! digest_with {
            ($hasher:ty) => {{
                let mut hasher = <$hasher>::new();
                for chunk in chunks {
                    hasher.update(chunk);
                }
                hasher.finalize().to_vec()
            }};
        }
        let raw = match self.algorithm {
            Algorithm::Sha224 => digest_with!(Sha224),
            Algorithm::Sha256 => digest_with!(Sha256),
            Algorithm::Sha384 => digest_with!(Sha384),
            Algorithm::Sha512 => digest_with!(Sha512),
            Algorithm::Sha3_224 => digest_with!(Sha3_224),
            Algorithm::Sha3_256 => digest_with!(Sha3_256),
            Algorithm::Sha3_384 => digest_with!(Sha3_384),
            Algorithm::Sha3_512 => digest_with!(Sha3_512),
        };
        self.encoding.encode_text(&hex::encode(raw))
    }

    /// Hashes a single record's bytes into a leaf digest.
    ///
    /// When `security` is enabled the bytes are preceded by the
    /// domain-separation leaf prefix (`0x00`, re-encoded to match
    /// `self.encoding`).
    #[must_use]
    pub fn hash_data(&self, data: &[u8]) -> Vec<u8> {
        if self.security {
            let prefix = self.encoding.encode_prefix(LEAF_PREFIX);
            self.digest(&[&prefix, data])
        } else {
            self.digest(&[data])
        }
    }

    /// Hashes a file's contents into a leaf digest, streaming it through the
    /// configured digest rather than buffering the whole file.
    pub fn hash_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, HashError> {
        let mut file = File::open(path)?;
        let mut buffer = vec![0_u8; 8192];
        let prefix = self.security.then(|| self.encoding.encode_prefix(LEAF_PREFIX));

        macro_rules! stream_with {
            ($hasher:ty) => {{
                let mut hasher = <$hasher>::new();
                if let Some(prefix) = &prefix {
                    hasher.update(prefix);
                }
                loop {
                    let read = file.read(&mut buffer)?;
                    if read == 0 {
                        break;
                    }
                    hasher.update(&buffer[..read]);
                }
                hasher.finalize().to_vec()
            }};
        }
        let raw = match self.algorithm {
            Algorithm::Sha224 => stream_with!(Sha224),
            Algorithm::Sha256 => stream_with!(Sha256),
            Algorithm::Sha384 => stream_with!(Sha384),
            Algorithm::Sha512 => stream_with!(Sha512),
            Algorithm::Sha3_224 => stream_with!(Sha3_224),
            Algorithm::Sha3_256 => stream_with!(Sha3_256),
            Algorithm::Sha3_384 => stream_with!(Sha3_384),
            Algorithm::Sha3_512 => stream_with!(Sha3_512),
        };
        Ok(self.encoding.encode_text(&hex::encode(raw)))
    }

    /// Hashes two child digests into their parent's digest.
    ///
    /// When `security` is enabled each operand is preceded by its own copy
    /// of the domain-separation pair prefix (`0x01`), so the two children of
    /// an interior node can never be confused with a single leaf's prefixed
    /// bytes.
    #[must_use]
    pub fn hash_pair(&self, left: &[u8], right: &[u8]) -> Vec<u8> {
        if self.security {
            let prefix = self.encoding.encode_prefix(PAIR_PREFIX);
            self.digest(&[&prefix, left, &prefix, right])
        } else {
            self.digest(&[left, right])
        }
    }

    /// Folds a sign-tagged path down to a single digest, starting the fold
    /// at `start`.
    ///
    /// `path[start]` is the element whose inclusion is being proven (or, for
    /// a consistency path, the boundary element the replay begins from);
    /// every other element is a sibling digest collected while walking up
    /// the tree. The fold grows a window `[lo, hi]` outward from `start`,
    /// one element at a time: at each step the running accumulator's
    /// current sign decides which edge to extend — [`Sign::Plus`] pulls in
    /// `path[hi + 1]`, folding `hash_pair(acc, path[hi + 1])`;
    /// [`Sign::Minus`] pulls in `path[lo - 1]`, folding
    /// `hash_pair(path[lo - 1], acc)` — and the accumulator adopts the
    /// just-absorbed element's sign before the next step. At a path
    /// boundary (the indicated side is already exhausted) the only
    /// remaining side is extended instead, so the fold always makes
    /// progress.
    pub fn hash_path(&self, path: &[SignedDigest], start: usize) -> Result<Vec<u8>, HashError> {
        if path.is_empty() {
            return Err(HashError::EmptyPath);
        }
        let n = path.len();
        let mut lo = start;
        let mut hi = start;
        let mut acc = path[start].digest.clone();
        let mut sign = path[start].sign;
        while lo > 0 || hi < n - 1 {
            let extend_right = match sign {
                Sign::Plus => hi < n - 1,
                Sign::Minus => lo == 0,
            };
            if extend_right {
                hi += 1;
                acc = self.hash_pair(&acc, &path[hi].digest);
                sign = path[hi].sign;
            } else {
                lo -= 1;
                acc = self.hash_pair(&path[lo].digest, &acc);
                sign = path[lo].sign;
            }
        }
        Ok(acc)
    }
}
