//! Token verification
//!
//! Parsing runs in a fixed order and stops at the first failure:
//!
//! 1. split into exactly three segments ([`JwtError::PartMissed`])
//! 2. base64url-decode every segment ([`JwtError::Decode`]) and the header
//!    JSON ([`JwtError::MalformedHeader`])
//! 3. require the header `alg` to equal the verifier's algorithm
//!    ([`JwtError::AlgorithmMismatch`])
//! 4. verify the received `header.claims` text against the signature
//!    ([`JwtError::InvalidSignature`]); a signature segment whose last
//!    symbol carries non-canonical trailing bits fails here too
//!
//! The algorithm label in the header never chooses how the signature is
//! checked; the verifier does. Expiry and other claim checks are separate,
//! see [`ValidationOptions`](crate::ValidationOptions).

use crate::algorithm::Verifier;
use crate::codec::{claims_from_json, decode_segment, decode_signature};
use crate::error::{JwtError, JwtResult, Segment};
use crate::header::Header;
use crate::token::Token;
use serde::de::DeserializeOwned;

/// Verifies tokens with one key.
#[derive(Debug, Clone)]
pub struct Parser<V> {
    verifier: V,
}

impl<V: Verifier> Parser<V> {
    /// Parser verifying with `verifier`.
    #[must_use]
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// The verifying key
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Split, decode and verify `raw`.
    ///
    /// # Errors
    /// See the [module documentation](self) for the order in which errors
    /// are reported.
    pub fn parse(&self, raw: &str) -> JwtResult<Token> {
        parse(raw, &self.verifier)
    }

    /// [`parse`](Self::parse), then deserialize the claims into `T`.
    ///
    /// # Errors
    /// Everything `parse` returns, plus `MalformedClaims` when the verified
    /// claims do not fit `T`.
    pub fn parse_claims<T: DeserializeOwned>(&self, raw: &str) -> JwtResult<(Token, T)> {
        parse_claims(raw, &self.verifier)
    }
}

struct Segments<'a> {
    header: &'a str,
    claims: &'a str,
    signature: &'a str,
}

fn split(raw: &str) -> JwtResult<Segments<'_>> {
    let mut parts = raw.split('.');
    let (Some(header), Some(claims), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(JwtError::PartMissed);
    };
    Ok(Segments {
        header,
        claims,
        signature,
    })
}

/// Verify `raw` with `verifier`.
///
/// # Errors
/// `PartMissed`, `Decode`, `MalformedHeader`, `AlgorithmMismatch` or
/// `InvalidSignature`, in pipeline order.
pub fn parse<V: Verifier + ?Sized>(raw: &str, verifier: &V) -> JwtResult<Token> {
    let expected = verifier.algorithm();
    let result = verify(raw, verifier);
    match &result {
        Ok(_) => tracing::trace!(alg = %expected, "token verified"),
        Err(e) => tracing::debug!(alg = %expected, error = %e, "token rejected"),
    }
    result
}

fn verify<V: Verifier + ?Sized>(raw: &str, verifier: &V) -> JwtResult<Token> {
    let segments = split(raw)?;

    let header_json = decode_segment(segments.header, Segment::Header)?;
    let claims = decode_segment(segments.claims, Segment::Claims)?;
    let signature = decode_signature(segments.signature)?;

    let header = Header::decode_expecting(&header_json, verifier.algorithm())?;

    // Non-canonical trailing bits: no signature encodes to this text
    let Some(signature) = signature else {
        return Err(JwtError::InvalidSignature);
    };

    let header_end = segments.header.len();
    let payload_end = header_end + 1 + segments.claims.len();
    verifier.verify(raw[..payload_end].as_bytes(), &signature)?;

    Ok(Token::new(
        raw.to_string(),
        header_end,
        payload_end,
        header,
        claims,
        signature,
    ))
}

/// Verify `raw` with `verifier` and deserialize its claims.
///
/// # Errors
/// Everything [`parse`] returns, plus `MalformedClaims`.
pub fn parse_claims<T, V>(raw: &str, verifier: &V) -> JwtResult<(Token, T)>
where
    T: DeserializeOwned,
    V: Verifier + ?Sized,
{
    let token = parse(raw, verifier)?;
    let claims = claims_from_json(token.raw_claims()).map_err(|e| {
        tracing::debug!(error = %e, "verified claims did not deserialize");
        e
    })?;
    Ok((token, claims))
}

/// Decode the header of `raw` without verifying anything.
///
/// Meant for picking a key by `kid` before calling [`parse`]. The result is
/// attacker-controlled until the token has been verified.
///
/// # Errors
/// `PartMissed`, `Decode`, `MalformedHeader`, or `UnsupportedAlgorithm` for
/// an `alg` this crate does not implement.
pub fn peek_header(raw: &str) -> JwtResult<Header> {
    let segments = split(raw)?;
    let json = decode_segment(segments.header, Segment::Header)?;
    Header::decode(&json)
}
