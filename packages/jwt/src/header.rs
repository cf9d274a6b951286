//! Token header

use crate::algorithm::Algorithm;
use crate::error::{JwtError, JwtResult};
use serde::{Deserialize, Serialize};

/// Value of `typ` in every header this crate produces.
pub const TOKEN_TYPE: &str = "JWT";

/// Token header.
///
/// Serializes as `{"alg":..,"typ":"JWT"}`, with `kid` appended only when
/// set. Unknown fields in incoming headers are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Signing algorithm
    pub alg: Algorithm,
    /// Token type, `"JWT"` when produced here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Key identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// Incoming header before `alg` is checked.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
    #[serde(default)]
    kid: Option<String>,
}

impl Header {
    /// Header for a freshly signed token.
    #[must_use]
    pub fn new(alg: Algorithm) -> Self {
        Self {
            alg,
            typ: Some(TOKEN_TYPE.to_string()),
            kid: None,
        }
    }

    /// Set the key identifier.
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    fn raw(json: &[u8]) -> JwtResult<RawHeader> {
        serde_json::from_slice(json).map_err(|e| JwtError::MalformedHeader(e.to_string()))
    }

    /// Decode header JSON, requiring `alg` to name `expected` exactly.
    pub(crate) fn decode_expecting(json: &[u8], expected: Algorithm) -> JwtResult<Self> {
        let raw = Self::raw(json)?;
        if raw.alg != expected.as_str() {
            return Err(JwtError::AlgorithmMismatch {
                expected,
                found: raw.alg,
            });
        }
        Ok(Self {
            alg: expected,
            typ: raw.typ,
            kid: raw.kid,
        })
    }

    /// Decode header JSON naming any supported algorithm.
    pub(crate) fn decode(json: &[u8]) -> JwtResult<Self> {
        let raw = Self::raw(json)?;
        Ok(Self {
            alg: raw.alg.parse()?,
            typ: raw.typ,
            kid: raw.kid,
        })
    }
}
