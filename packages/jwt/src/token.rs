//! Signed token value

use crate::codec::claims_from_json;
use crate::error::JwtResult;
use crate::header::Header;
use serde::de::DeserializeOwned;
use std::fmt;

/// An issued or verified token.
///
/// Only [`Builder`](crate::Builder) and [`Parser`](crate::Parser) create
/// tokens; every accessor borrows from data fixed at construction, so
/// repeated calls return identical bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    header_end: usize,
    payload_end: usize,
    header: Header,
    claims: Vec<u8>,
    signature: Vec<u8>,
}

impl Token {
    /// `raw[..header_end]` is the header segment, `raw[..payload_end]` the
    /// payload; both indices point at a `.` separator.
    pub(crate) fn new(
        raw: String,
        header_end: usize,
        payload_end: usize,
        header: Header,
        claims: Vec<u8>,
        signature: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(raw.as_bytes().get(header_end), Some(&b'.'));
        debug_assert_eq!(raw.as_bytes().get(payload_end), Some(&b'.'));
        Self {
            raw,
            header_end,
            payload_end,
            header,
            claims,
            signature,
        }
    }

    /// Decoded header
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Decoded claims JSON.
    #[must_use]
    pub fn raw_claims(&self) -> &[u8] {
        &self.claims
    }

    /// Deserialize the claims into `T`.
    ///
    /// # Errors
    /// `MalformedClaims` if the JSON does not fit `T`.
    pub fn claims<T: DeserializeOwned>(&self) -> JwtResult<T> {
        claims_from_json(&self.claims)
    }

    /// Encoded header segment
    #[must_use]
    pub fn raw_header(&self) -> &str {
        &self.raw[..self.header_end]
    }

    /// Encoded claims segment
    #[must_use]
    pub fn raw_claims_segment(&self) -> &str {
        &self.raw[self.header_end + 1..self.payload_end]
    }

    /// Header segment and claims segment joined by `.`: the signed bytes.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.raw[..self.payload_end]
    }

    /// Decoded signature
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The full three-segment credential.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Consume the token, keeping only the credential string.
    #[must_use]
    pub fn into_raw(self) -> String {
        self.raw
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("header", &self.header)
            .field("claims", &String::from_utf8_lossy(&self.claims))
            .field("signature_len", &self.signature.len())
            .finish_non_exhaustive()
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Algorithm;

    fn token() -> Token {
        Token::new(
            "aGVhZA.Y2xhaW1z.c2ln".to_string(),
            6,
            15,
            Header::new(Algorithm::HS256),
            b"claims".to_vec(),
            b"sig".to_vec(),
        )
    }

    #[test]
    fn slices_segments_from_raw() {
        let token = token();
        assert_eq!(token.raw_header(), "aGVhZA");
        assert_eq!(token.raw_claims_segment(), "Y2xhaW1z");
        assert_eq!(token.payload(), "aGVhZA.Y2xhaW1z");
        assert_eq!(token.raw(), "aGVhZA.Y2xhaW1z.c2ln");
        assert_eq!(token.signature(), b"sig");
    }

    #[test]
    fn accessors_are_idempotent() {
        let token = token();
        assert_eq!(token.raw(), token.raw());
        assert_eq!(token.payload(), token.payload());
        assert_eq!(token.raw_claims(), token.raw_claims());
        assert_eq!(token.to_string(), token.raw());
    }

    #[test]
    fn debug_omits_signature_bytes() {
        let shown = format!("{:?}", token());
        assert!(shown.contains("signature_len: 3"));
        assert!(!shown.contains("c2ln"));
    }
}
