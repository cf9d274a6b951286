//! HMAC-SHA algorithms (HS256, HS384, HS512)

use super::{Algorithm, Family, Signer, Verifier, expect_family};
use crate::error::{JwtError, JwtResult};
use ::hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

macro_rules! mac {
    ($mac:ty, $secret:expr, $payload:expr) => {{
        let mut mac = <$mac>::new_from_slice($secret)
            .map_err(|_| JwtError::invalid_key("HMAC rejected the secret"))?;
        mac.update($payload);
        mac.finalize().into_bytes().to_vec()
    }};
}

/// Shared secret bound to one HMAC algorithm.
///
/// Signs and verifies. The secret may have any non-zero length and is wiped
/// from memory when the key is dropped.
#[derive(Clone)]
pub struct HmacKey {
    algorithm: Algorithm,
    secret: Zeroizing<Vec<u8>>,
}

impl HmacKey {
    /// Bind `secret` to an HMAC `algorithm`.
    ///
    /// # Errors
    /// `InvalidKey` if the secret is empty, `UnsupportedAlgorithm` if
    /// `algorithm` is not HS256/HS384/HS512.
    pub fn new(algorithm: Algorithm, secret: impl Into<Vec<u8>>) -> JwtResult<Self> {
        expect_family(algorithm, Family::Hmac)?;
        let secret = Zeroizing::new(secret.into());
        if secret.is_empty() {
            return Err(JwtError::invalid_key("HMAC secret must not be empty"));
        }
        Ok(Self { algorithm, secret })
    }

    /// HS256 key
    ///
    /// # Errors
    /// `InvalidKey` if the secret is empty.
    pub fn hs256(secret: impl Into<Vec<u8>>) -> JwtResult<Self> {
        Self::new(Algorithm::HS256, secret)
    }

    /// HS384 key
    ///
    /// # Errors
    /// `InvalidKey` if the secret is empty.
    pub fn hs384(secret: impl Into<Vec<u8>>) -> JwtResult<Self> {
        Self::new(Algorithm::HS384, secret)
    }

    /// HS512 key
    ///
    /// # Errors
    /// `InvalidKey` if the secret is empty.
    pub fn hs512(secret: impl Into<Vec<u8>>) -> JwtResult<Self> {
        Self::new(Algorithm::HS512, secret)
    }

    /// Algorithm this secret is bound to.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn mac(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        let tag = match self.algorithm {
            Algorithm::HS256 => mac!(HmacSha256, &self.secret, payload),
            Algorithm::HS384 => mac!(HmacSha384, &self.secret, payload),
            Algorithm::HS512 => mac!(HmacSha512, &self.secret, payload),
            other => return Err(JwtError::UnsupportedAlgorithm(other.to_string())),
        };
        Ok(tag)
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacKey")
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Signer for HmacKey {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        self.mac(payload)
    }
}

impl Verifier for HmacKey {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        let expected = self.mac(payload)?;
        // Length mismatch also compares unequal without an early return
        if bool::from(expected.as_slice().ct_eq(signature)) {
            Ok(())
        } else {
            Err(JwtError::InvalidSignature)
        }
    }
}
