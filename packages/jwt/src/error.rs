//! Token error types

use crate::algorithm::Algorithm;
use std::fmt;
use thiserror::Error;

/// Token operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// Which of the three token segments an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// First segment, the encoded header.
    Header,
    /// Second segment, the encoded claims.
    Claims,
    /// Third segment, the encoded signature.
    Signature,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Segment::Header => "header",
            Segment::Claims => "claims",
            Segment::Signature => "signature",
        })
    }
}

/// Token error kinds.
///
/// Callers match on the variant, never on the message. Structural problems
/// ([`JwtError::is_malformed`]) are kept apart from signatures that do not
/// verify so the two can be handled differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// Token does not have exactly three segments
    #[error("token format is invalid")]
    PartMissed,

    /// Key material unusable for the selected algorithm
    #[error("key is invalid: {0}")]
    InvalidKey(String),

    /// Signature is well formed but does not verify
    #[error("signature is invalid")]
    InvalidSignature,

    /// A segment is not valid unpadded base64url
    #[error("{segment} segment is not valid base64url: {message}")]
    Decode {
        /// Segment that failed to decode.
        segment: Segment,
        /// Decoder message.
        message: String,
    },

    /// Header JSON is malformed or lacks `alg`
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Claims JSON does not match the requested type
    #[error("malformed claims: {0}")]
    MalformedClaims(String),

    /// Claims or header could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Header names a different algorithm than the verifier
    #[error("algorithm mismatch: verifier uses {expected}, token header says {found}")]
    AlgorithmMismatch {
        /// Algorithm of the verifying key.
        expected: Algorithm,
        /// Label found in the token header.
        found: String,
    },

    /// Algorithm unknown or not usable with this key family
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The signing primitive failed
    #[error("signing error: {0}")]
    Signing(String),

    /// Token has expired
    #[error("token has expired")]
    TokenExpired,

    /// Token not yet valid
    #[error("token not yet valid")]
    TokenNotYetValid,

    /// Issuer does not match
    #[error("invalid issuer")]
    InvalidIssuer,

    /// Audience does not match
    #[error("invalid audience")]
    InvalidAudience,

    /// Missing required claim
    #[error("missing required claim: {0}")]
    MissingClaim(String),
}

impl JwtError {
    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        JwtError::InvalidKey(msg.into())
    }

    /// Create a decode error for the given segment
    #[inline]
    #[must_use]
    pub fn decode(segment: Segment, err: impl fmt::Display) -> Self {
        JwtError::Decode {
            segment,
            message: err.to_string(),
        }
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(err: impl fmt::Display) -> Self {
        JwtError::Serialization(err.to_string())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing(err: impl fmt::Display) -> Self {
        JwtError::Signing(err.to_string())
    }

    /// True for input that is not a well-formed token at all, as opposed to
    /// a well-formed token that fails verification or validation.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            JwtError::PartMissed
                | JwtError::Decode { .. }
                | JwtError::MalformedHeader(_)
                | JwtError::MalformedClaims(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_error_constants() {
        assert_eq!(JwtError::PartMissed.to_string(), "token format is invalid");
        assert_eq!(JwtError::InvalidSignature.to_string(), "signature is invalid");
        assert_eq!(
            JwtError::invalid_key("empty secret").to_string(),
            "key is invalid: empty secret"
        );
    }

    #[test]
    fn structural_errors_are_malformed() {
        assert!(JwtError::PartMissed.is_malformed());
        assert!(JwtError::decode(Segment::Signature, "bad byte").is_malformed());
        assert!(!JwtError::InvalidSignature.is_malformed());
        assert!(
            !JwtError::AlgorithmMismatch {
                expected: Algorithm::HS256,
                found: "none".into()
            }
            .is_malformed()
        );
    }

    #[test]
    fn decode_error_names_segment() {
        let err = JwtError::decode(Segment::Claims, "Invalid padding");
        assert_eq!(
            err.to_string(),
            "claims segment is not valid base64url: Invalid padding"
        );
    }
}
