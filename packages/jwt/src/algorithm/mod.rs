//! Signing algorithms
//!
//! Every supported scheme is identified by an [`Algorithm`] value and backed
//! by one key type per family:
//!
//! - [`HmacKey`]: HS256, HS384, HS512
//! - [`RsaSigner`] / [`RsaVerifier`]: RS256, RS384, RS512 (PKCS#1 v1.5) and
//!   PS256, PS384, PS512 (PSS)
//! - [`EcdsaSigner`] / [`EcdsaVerifier`]: ES256 (P-256), ES384 (P-384)
//!
//! The key types implement [`Signer`] and/or [`Verifier`]. The verifier is
//! always picked by the caller; the `alg` label inside a token is only
//! compared against it, never used to choose it.

mod ecdsa;
mod hmac;
mod rsa;

pub use self::ecdsa::{EcdsaSigner, EcdsaVerifier};
pub use self::hmac::HmacKey;
pub use self::rsa::{MIN_RSA_KEY_BITS, RsaSigner, RsaVerifier};

use crate::error::{JwtError, JwtResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr, sync::Arc};

/// Signature scheme identifier, written verbatim into the `alg` header.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// HMAC with SHA-256
    HS256,
    /// HMAC with SHA-384
    HS384,
    /// HMAC with SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 with SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 with SHA-512
    RS512,
    /// RSASSA-PSS with SHA-256
    PS256,
    /// RSASSA-PSS with SHA-384
    PS384,
    /// RSASSA-PSS with SHA-512
    PS512,
    /// ECDSA on P-256 with SHA-256
    ES256,
    /// ECDSA on P-384 with SHA-384
    ES384,
}

/// Key family an [`Algorithm`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Shared-secret MAC
    Hmac,
    /// RSA, either padding
    Rsa,
    /// Elliptic-curve DSA
    Ecdsa,
}

impl Algorithm {
    /// Every supported algorithm.
    pub const ALL: [Algorithm; 11] = [
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::PS256,
        Algorithm::PS384,
        Algorithm::PS512,
        Algorithm::ES256,
        Algorithm::ES384,
    ];

    /// Canonical name as it appears in the `alg` header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
            Algorithm::PS256 => "PS256",
            Algorithm::PS384 => "PS384",
            Algorithm::PS512 => "PS512",
            Algorithm::ES256 => "ES256",
            Algorithm::ES384 => "ES384",
        }
    }

    /// Key family
    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Family::Hmac,
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Family::Rsa,
            Algorithm::ES256 | Algorithm::ES384 => Family::Ecdsa,
        }
    }

    /// True for shared-secret schemes.
    #[must_use]
    pub const fn is_symmetric(self) -> bool {
        matches!(self.family(), Family::Hmac)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| JwtError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Produces signatures over a token payload.
///
/// Implementations hold immutable key material and must be safe to share
/// between threads.
pub trait Signer: Send + Sync {
    /// Algorithm written into the header of every token this key signs.
    fn algorithm(&self) -> Algorithm;

    /// Sign `payload` (`header-segment.claims-segment`).
    ///
    /// # Errors
    /// Returns `JwtError::Signing` if the primitive fails.
    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>>;
}

/// Checks signatures over a token payload.
pub trait Verifier: Send + Sync {
    /// Algorithm this key verifies; tokens labelled otherwise are rejected.
    fn algorithm(&self) -> Algorithm;

    /// Verify `signature` over `payload`.
    ///
    /// # Errors
    /// Returns `JwtError::InvalidSignature` unless the signature is valid for
    /// `payload` under this key.
    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()>;
}

impl<T: Signer + ?Sized> Signer for Arc<T> {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        (**self).sign(payload)
    }
}

impl<T: Verifier + ?Sized> Verifier for Arc<T> {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        (**self).verify(payload, signature)
    }
}

impl<T: Signer + ?Sized> Signer for &T {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        (**self).sign(payload)
    }
}

impl<T: Verifier + ?Sized> Verifier for &T {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        (**self).verify(payload, signature)
    }
}

impl<T: Signer + ?Sized> Signer for Box<T> {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        (**self).sign(payload)
    }
}

impl<T: Verifier + ?Sized> Verifier for Box<T> {
    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        (**self).verify(payload, signature)
    }
}

/// Reject constructing a key of one family for an algorithm of another.
pub(crate) fn expect_family(algorithm: Algorithm, family: Family) -> JwtResult<()> {
    if algorithm.family() == family {
        Ok(())
    } else {
        Err(JwtError::UnsupportedAlgorithm(format!(
            "{algorithm} is not a {family:?} algorithm"
        )))
    }
}
