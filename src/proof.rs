//! The proof object: a header identifying the proof and the engine that
//! produced it, and a body carrying the offset/path pymerkle calls
//! `proof_index`/`proof_path`.

use chrono::{
    DateTime,
    Utc,
};
use uuid::Uuid;

use crate::hashing::{
    HashEngine,
    SignedDigest,
};

/// Whether a proof has been checked against a claimed root, and if so,
/// whether it held up. Mirrors pymerkle's `Proof.header['status']`, which
/// starts `None` and is set by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Unchecked,
    Valid,
    Invalid,
}

/// Identifying metadata for a [`Proof`]: who generated it, when, and under
/// which hashing configuration.
#[derive(Debug, Clone)]
pub struct ProofHeader {
    pub uuid: Uuid,
    pub timestamp: u64,
    pub created_at: DateTime<Utc>,
    /// `false` when the proof carries no path because no matching leaf or
    /// prefix was found for the challenge.
    pub generation: bool,
    pub provider: Uuid,
    pub algorithm: String,
    pub encoding: String,
    pub security: bool,
    pub status: ValidationStatus,
}

/// The offset and signed path that let a verifier fold a challenge digest
/// up to a root.
///
/// `offset` is `-1` and `path` is empty when generation failed to find a
/// matching leaf or prefix, matching pymerkle's `{'offset': -1, 'path':
/// []}` convention for a proof of non-membership.
#[derive(Debug, Clone)]
pub struct ProofBody {
    pub offset: i64,
    pub path: Vec<SignedDigest>,
}

/// An audit or consistency proof.
#[derive(Debug, Clone)]
pub struct Proof {
    pub header: ProofHeader,
    pub body: ProofBody,
}

impl Proof {
    pub(crate) fn success(engine: &HashEngine, provider: Uuid, offset: i64, path: Vec<SignedDigest>) -> Self {
        Self::new(engine, provider, true, offset, path)
    }

    pub(crate) fn failure(engine: &HashEngine, provider: Uuid) -> Self {
        Self::new(engine, provider, false, -1, Vec::new())
    }

    fn new(engine: &HashEngine, provider: Uuid, generation: bool, offset: i64, path: Vec<SignedDigest>) -> Self {
        let now = Utc::now();
        Self {
            header: ProofHeader {
                uuid: Uuid::new_v4(),
                timestamp: now.timestamp().max(0) as u64,
                created_at: now,
                generation,
                provider,
                algorithm: engine.algorithm().name().to_owned(),
                encoding: engine.encoding().name().to_owned(),
                security: engine.security(),
                status: ValidationStatus::Unchecked,
            },
            body: ProofBody {
                offset,
                path,
            },
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.path.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.path.len()
    }
}

impl std::fmt::Display for Proof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Proof(uuid={}, offset={}, path_len={}, algorithm={}, security={})",
            self.header.uuid,
            self.body.offset,
            self.body.path.len(),
            self.header.algorithm,
            self.header.security,
        )
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::{
        ser::SerializeStruct,
        Deserialize,
        Deserializer,
        Serialize,
        Serializer,
    };

    use super::{
        Proof,
        ProofHeader,
        ValidationStatus,
    };
    use crate::hashing::{
        Encoding,
        Sign,
        SignedDigest,
    };

    impl Serialize for ValidationStatus {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                ValidationStatus::Unchecked => serializer.serialize_none(),
                ValidationStatus::Valid => serializer.serialize_bool(true),
                ValidationStatus::Invalid => serializer.serialize_bool(false),
            }
        }
    }

    impl<'de> Deserialize<'de> for ValidationStatus {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Ok(match Option::<bool>::deserialize(deserializer)? {
                None => ValidationStatus::Unchecked,
                Some(true) => ValidationStatus::Valid,
                Some(false) => ValidationStatus::Invalid,
            })
        }
    }

    impl Serialize for ProofHeader {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("ProofHeader", 9)?;
            state.serialize_field("creation_moment", &self.created_at.to_rfc3339())?;
            state.serialize_field("encoding", &self.encoding)?;
            state.serialize_field("generation", &self.generation)?;
            state.serialize_field("hash_type", &self.algorithm)?;
            state.serialize_field("provider", &self.provider.to_string())?;
            state.serialize_field("security", &self.security)?;
            state.serialize_field("status", &self.status)?;
            state.serialize_field("timestamp", &self.timestamp)?;
            state.serialize_field("uuid", &self.uuid.to_string())?;
            state.end()
        }
    }

    /// Resolves a proof header's text encoding, falling back to UTF-8 if the
    /// header names one this build doesn't recognize. Needed because a
    /// digest is carried as hex text under that encoding, not as raw bytes,
    /// so turning it into the plain hex string the wire format expects
    /// requires decoding it first.
    fn header_encoding(header: &ProofHeader) -> Encoding {
        Encoding::from_name(&header.encoding).unwrap_or(Encoding::Utf8)
    }

    fn signed_digest_to_pair(digest: &SignedDigest, encoding: Encoding) -> (i8, String) {
        let sign = match digest.sign {
            Sign::Plus => 1_i8,
            Sign::Minus => -1_i8,
        };
        let text = encoding.decode_text(&digest.digest).unwrap_or_else(|| hex::encode(&digest.digest));
        (sign, text)
    }

    fn pair_to_signed_digest(sign: i8, text: &str, encoding: Encoding) -> SignedDigest {
        let sign = if sign >= 0 { Sign::Plus } else { Sign::Minus };
        SignedDigest::new(sign, encoding.encode_text(text))
    }

    /// Mirrors `ProofBody`'s shape under the wire field names
    /// (`proof_index`/`proof_path`), with each path digest already decoded
    /// to its canonical hex string.
    struct ProofBodyJson {
        proof_index: i64,
        proof_path: Vec<(i8, String)>,
    }

    impl Serialize for ProofBodyJson {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("ProofBody", 2)?;
            state.serialize_field("proof_index", &self.proof_index)?;
            state.serialize_field("proof_path", &self.proof_path)?;
            state.end()
        }
    }

    impl Serialize for Proof {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let encoding = header_encoding(&self.header);
            let body = ProofBodyJson {
                proof_index: self.body.offset,
                proof_path: self.body.path.iter().map(|sd| signed_digest_to_pair(sd, encoding)).collect(),
            };
            let mut state = serializer.serialize_struct("Proof", 2)?;
            state.serialize_field("body", &body)?;
            state.serialize_field("header", &self.header)?;
            state.end()
        }
    }

    #[derive(Deserialize)]
    struct ProofHeaderShadow {
        creation_moment: String,
        encoding: String,
        generation: bool,
        hash_type: String,
        provider: String,
        security: bool,
        status: ValidationStatus,
        timestamp: u64,
        uuid: String,
    }

    #[derive(Deserialize)]
    struct ProofBodyShadow {
        proof_index: i64,
        proof_path: Vec<(i8, String)>,
    }

    #[derive(Deserialize)]
    struct ProofShadow {
        body: ProofBodyShadow,
        header: ProofHeaderShadow,
    }

    impl<'de> Deserialize<'de> for Proof {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let shadow = ProofShadow::deserialize(deserializer)?;
            let created_at = chrono::DateTime::parse_from_rfc3339(&shadow.header.creation_moment)
                .map_err(serde::de::Error::custom)?
                .with_timezone(&chrono::Utc);
            let uuid = uuid::Uuid::parse_str(&shadow.header.uuid).map_err(serde::de::Error::custom)?;
            let provider = uuid::Uuid::parse_str(&shadow.header.provider).map_err(serde::de::Error::custom)?;
            let encoding = Encoding::from_name(&shadow.header.encoding).unwrap_or(Encoding::Utf8);

            let path = shadow
                .body
                .proof_path
                .iter()
                .map(|(sign, text)| pair_to_signed_digest(*sign, text, encoding))
                .collect();

            Ok(Proof {
                header: ProofHeader {
                    uuid,
                    timestamp: shadow.header.timestamp,
                    created_at,
                    generation: shadow.header.generation,
                    provider,
                    algorithm: shadow.header.hash_type,
                    encoding: shadow.header.encoding,
                    security: shadow.header.security,
                    status: shadow.header.status,
                },
                body: super::ProofBody {
                    offset: shadow.body.proof_index,
                    path,
                },
            })
        }
    }
}
