//! Token issuance

use crate::algorithm::Signer;
use crate::codec::{encode_segment, to_json};
use crate::error::JwtResult;
use crate::header::Header;
use crate::token::Token;
use serde::Serialize;

/// Signs claims into tokens with one key.
///
/// A builder holds no state besides the signer and optional key id; it can
/// be shared and used concurrently.
///
/// ```
/// use jwtkit::{Builder, HmacKey, StandardClaims};
///
/// let builder = Builder::new(HmacKey::hs256(b"secret".to_vec())?);
/// let claims = StandardClaims::new()
///     .audience("admin")
///     .jwt_id("random-unique-string");
/// let token = builder.build(&claims)?;
///
/// assert_eq!(
///     token.raw(),
///     "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9\
///      .eyJhdWQiOiJhZG1pbiIsImp0aSI6InJhbmRvbS11bmlxdWUtc3RyaW5nIn0\
///      .dv9-XpY9P8ypm1uWQwB6eKvq3jeyodLA7brhjsf4JVs"
/// );
/// # Ok::<(), jwtkit::JwtError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Builder<S> {
    signer: S,
    key_id: Option<String>,
}

impl<S: Signer> Builder<S> {
    /// Builder signing with `signer`.
    #[must_use]
    pub fn new(signer: S) -> Self {
        Self {
            signer,
            key_id: None,
        }
    }

    /// Write `kid` into every header.
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.key_id = Some(kid.into());
        self
    }

    /// The signing key
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Serialize `claims` to JSON and sign them.
    ///
    /// # Errors
    /// `Serialization` if the claims cannot be encoded; any error from the
    /// signer.
    pub fn build<C: Serialize + ?Sized>(&self, claims: &C) -> JwtResult<Token> {
        let claims = to_json(claims)?;
        self.build_raw(claims)
    }

    /// Sign already-serialized claims bytes as they are.
    ///
    /// # Errors
    /// `Serialization` if the header cannot be encoded; any error from the
    /// signer.
    pub fn build_raw(&self, claims: impl Into<Vec<u8>>) -> JwtResult<Token> {
        let claims = claims.into();
        let algorithm = self.signer.algorithm();

        let mut header = Header::new(algorithm);
        header.kid.clone_from(&self.key_id);

        let header_segment = encode_segment(&to_json(&header)?);
        let claims_segment = encode_segment(&claims);

        // Room for a 512-byte (4096-bit RSA) signature.
        let mut raw =
            String::with_capacity(header_segment.len() + claims_segment.len() + 2 + 684);
        raw.push_str(&header_segment);
        let header_end = raw.len();
        raw.push('.');
        raw.push_str(&claims_segment);
        let payload_end = raw.len();

        let signature = self.signer.sign(raw.as_bytes()).map_err(|e| {
            tracing::debug!(alg = %algorithm, error = %e, "token signing failed");
            e
        })?;

        raw.push('.');
        raw.push_str(&encode_segment(&signature));

        tracing::trace!(alg = %algorithm, len = raw.len(), "token issued");
        Ok(Token::new(
            raw,
            header_end,
            payload_end,
            header,
            claims,
            signature,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{Algorithm, HmacKey};
    use crate::error::JwtError;

    struct FailingSigner;

    impl Signer for FailingSigner {
        fn algorithm(&self) -> Algorithm {
            Algorithm::HS256
        }

        fn sign(&self, _payload: &[u8]) -> JwtResult<Vec<u8>> {
            Err(JwtError::signing("device unavailable"))
        }
    }

    #[test]
    fn payload_is_header_dot_claims() {
        let builder = Builder::new(HmacKey::hs256(b"secret".to_vec()).unwrap());
        let token = builder.build(&serde_json::json!({"sub": "a"})).unwrap();
        assert_eq!(
            token.payload(),
            format!("{}.{}", token.raw_header(), token.raw_claims_segment())
        );
        assert_eq!(token.raw_claims(), br#"{"sub":"a"}"#);
        assert_eq!(token.raw().matches('.').count(), 2);
    }

    #[test]
    fn header_names_signer_algorithm() {
        let builder = Builder::new(HmacKey::hs512(b"secret".to_vec()).unwrap());
        let token = builder.build_raw(b"{}".to_vec()).unwrap();
        assert_eq!(token.header(), &Header::new(Algorithm::HS512));
    }

    #[test]
    fn key_id_lands_in_header() {
        let builder =
            Builder::new(HmacKey::hs256(b"secret".to_vec()).unwrap()).with_key_id("2024-01");
        let token = builder.build_raw(b"{}".to_vec()).unwrap();
        assert_eq!(token.header().kid.as_deref(), Some("2024-01"));
        assert_eq!(
            token.raw_header(),
            encode_segment(br#"{"alg":"HS256","typ":"JWT","kid":"2024-01"}"#)
        );
    }

    #[test]
    fn signer_failure_returns_no_token() {
        let builder = Builder::new(FailingSigner);
        assert_eq!(
            builder.build_raw(b"{}".to_vec()),
            Err(JwtError::Signing("device unavailable".into()))
        );
    }

    #[test]
    fn unserializable_claims_fail_before_signing() {
        let mut claims = std::collections::HashMap::new();
        claims.insert(vec![1u8], "non-string key");
        let builder = Builder::new(FailingSigner);
        assert!(matches!(builder.build(&claims), Err(JwtError::Serialization(_))));
    }

    #[test]
    fn building_is_deterministic_for_hmac() {
        let builder = Builder::new(HmacKey::hs256(b"secret".to_vec()).unwrap());
        let claims = serde_json::json!({"jti": "x"});
        assert_eq!(builder.build(&claims).unwrap(), builder.build(&claims).unwrap());
    }
}
