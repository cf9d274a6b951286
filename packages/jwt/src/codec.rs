//! Segment codec: unpadded base64url (RFC 7515) and JSON encoding

use crate::error::{JwtError, JwtResult, Segment};
use base64::{DecodeError, Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};

/// Encode bytes as base64url without padding.
#[inline]
#[must_use]
pub fn encode_segment(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Decode an unpadded base64url segment.
///
/// Padding characters, characters outside the URL-safe alphabet and
/// non-canonical trailing bits are all rejected.
///
/// # Errors
/// Returns `JwtError::Decode` naming `segment` when the text is not valid
/// unpadded base64url.
#[inline]
pub fn decode_segment(input: &str, segment: Segment) -> JwtResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| JwtError::decode(segment, e))
}

/// Decode the signature segment.
///
/// `Ok(None)` when the text is well-formed apart from non-canonical trailing
/// bits in its last symbol. Such a segment cannot be the encoding of any
/// signature, so it is a bad signature rather than a malformed token.
///
/// # Errors
/// `JwtError::Decode` for characters outside the alphabet, padding or an
/// impossible length.
pub(crate) fn decode_signature(input: &str) -> JwtResult<Option<Vec<u8>>> {
    match URL_SAFE_NO_PAD.decode(input) {
        Ok(signature) => Ok(Some(signature)),
        Err(DecodeError::InvalidLastSymbol(..)) => Ok(None),
        Err(e) => Err(JwtError::decode(Segment::Signature, e)),
    }
}

/// Serialize a value to JSON bytes.
///
/// Output is stable for a given value: struct fields keep declaration order
/// and `serde_json` maps are sorted by key.
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> JwtResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(JwtError::serialization)
}

/// Deserialize claims JSON into the caller's type.
pub(crate) fn claims_from_json<T: DeserializeOwned>(bytes: &[u8]) -> JwtResult<T> {
    serde_json::from_slice(bytes).map_err(|e| JwtError::MalformedClaims(e.to_string()))
}
