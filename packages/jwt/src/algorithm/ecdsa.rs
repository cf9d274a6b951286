//! ECDSA algorithms (ES256 on P-256, ES384 on P-384)
//!
//! Signatures use the fixed-width `r || s` encoding JWS requires, not DER.

use super::{Algorithm, Family, Signer, Verifier, expect_family};
use crate::error::{JwtError, JwtResult};
use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use std::fmt;

#[derive(Clone)]
enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

#[derive(Clone)]
enum VerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

fn curve_name(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::ES384 => "P-384",
        _ => "P-256",
    }
}

fn wrong_curve(algorithm: Algorithm, err: impl fmt::Display) -> JwtError {
    JwtError::invalid_key(format!(
        "{algorithm} requires a {} key: {err}",
        curve_name(algorithm)
    ))
}

fn pem_str(pem: &[u8]) -> JwtResult<&str> {
    std::str::from_utf8(pem).map_err(|_| JwtError::invalid_key("Invalid UTF-8 in PEM key"))
}

impl SigningKey {
    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        match self {
            SigningKey::P256(k) => {
                let sig: p256::ecdsa::Signature = k.try_sign(payload).map_err(JwtError::signing)?;
                Ok(sig.to_bytes().to_vec())
            }
            SigningKey::P384(k) => {
                let sig: p384::ecdsa::Signature = k.try_sign(payload).map_err(JwtError::signing)?;
                Ok(sig.to_bytes().to_vec())
            }
        }
    }

    fn verifying_key(&self) -> VerifyingKey {
        match self {
            SigningKey::P256(k) => VerifyingKey::P256(k.verifying_key().clone()),
            SigningKey::P384(k) => VerifyingKey::P384(k.verifying_key().clone()),
        }
    }
}

impl VerifyingKey {
    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        let valid = match self {
            VerifyingKey::P256(k) => p256::ecdsa::Signature::from_slice(signature)
                .map(|sig| k.verify(payload, &sig).is_ok())
                .unwrap_or(false),
            VerifyingKey::P384(k) => p384::ecdsa::Signature::from_slice(signature)
                .map(|sig| k.verify(payload, &sig).is_ok())
                .unwrap_or(false),
        };
        if valid {
            Ok(())
        } else {
            Err(JwtError::InvalidSignature)
        }
    }
}

/// ECDSA private key bound to ES256 or ES384.
///
/// The curve is fixed by the algorithm: ES256 only accepts P-256 keys and
/// ES384 only P-384 keys. Signing is deterministic (RFC 6979).
#[derive(Clone)]
pub struct EcdsaSigner {
    algorithm: Algorithm,
    key: SigningKey,
    verifier: EcdsaVerifier,
}

impl EcdsaSigner {
    fn from_key(algorithm: Algorithm, key: SigningKey) -> Self {
        let verifier = EcdsaVerifier {
            algorithm,
            key: key.verifying_key(),
        };
        Self {
            algorithm,
            key,
            verifier,
        }
    }

    /// ES256 signer from a P-256 key
    #[must_use]
    pub fn es256(key: p256::ecdsa::SigningKey) -> Self {
        Self::from_key(Algorithm::ES256, SigningKey::P256(key))
    }

    /// ES384 signer from a P-384 key
    #[must_use]
    pub fn es384(key: p384::ecdsa::SigningKey) -> Self {
        Self::from_key(Algorithm::ES384, SigningKey::P384(key))
    }

    /// Load a PKCS#8 DER private key for `algorithm`.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` for non-ECDSA algorithms, `InvalidKey` if the
    /// key is malformed or on the wrong curve.
    pub fn from_pkcs8_der(algorithm: Algorithm, der: &[u8]) -> JwtResult<Self> {
        expect_family(algorithm, Family::Ecdsa)?;
        let key = match algorithm {
            Algorithm::ES256 => SigningKey::P256(
                p256::ecdsa::SigningKey::from_pkcs8_der(der)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
            _ => SigningKey::P384(
                p384::ecdsa::SigningKey::from_pkcs8_der(der)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
        };
        Ok(Self::from_key(algorithm, key))
    }

    /// Load a PKCS#8 PEM (`PRIVATE KEY`) private key for `algorithm`.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` for non-ECDSA algorithms, `InvalidKey` if the
    /// key is malformed or on the wrong curve.
    pub fn from_pem(algorithm: Algorithm, pem: &[u8]) -> JwtResult<Self> {
        expect_family(algorithm, Family::Ecdsa)?;
        let pem = pem_str(pem)?;
        let key = match algorithm {
            Algorithm::ES256 => SigningKey::P256(
                p256::ecdsa::SigningKey::from_pkcs8_pem(pem)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
            _ => SigningKey::P384(
                p384::ecdsa::SigningKey::from_pkcs8_pem(pem)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
        };
        Ok(Self::from_key(algorithm, key))
    }

    /// Algorithm this key signs with.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Verifier for the public half of this key.
    #[must_use]
    pub fn verifier(&self) -> &EcdsaVerifier {
        &self.verifier
    }
}

impl fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaSigner")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Signer for EcdsaSigner {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        self.key.sign(payload)
    }
}

impl Verifier for EcdsaSigner {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        self.verifier.key.verify(payload, signature)
    }
}

/// ECDSA public key bound to ES256 or ES384.
#[derive(Clone)]
pub struct EcdsaVerifier {
    algorithm: Algorithm,
    key: VerifyingKey,
}

impl EcdsaVerifier {
    /// ES256 verifier from a P-256 key
    #[must_use]
    pub fn es256(key: p256::ecdsa::VerifyingKey) -> Self {
        Self {
            algorithm: Algorithm::ES256,
            key: VerifyingKey::P256(key),
        }
    }

    /// ES384 verifier from a P-384 key
    #[must_use]
    pub fn es384(key: p384::ecdsa::VerifyingKey) -> Self {
        Self {
            algorithm: Algorithm::ES384,
            key: VerifyingKey::P384(key),
        }
    }

    /// Load a DER `SubjectPublicKeyInfo` for `algorithm`.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` for non-ECDSA algorithms, `InvalidKey` if the
    /// key is malformed or on the wrong curve.
    pub fn from_public_key_der(algorithm: Algorithm, der: &[u8]) -> JwtResult<Self> {
        expect_family(algorithm, Family::Ecdsa)?;
        let key = match algorithm {
            Algorithm::ES256 => VerifyingKey::P256(
                p256::ecdsa::VerifyingKey::from_public_key_der(der)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
            _ => VerifyingKey::P384(
                p384::ecdsa::VerifyingKey::from_public_key_der(der)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
        };
        Ok(Self { algorithm, key })
    }

    /// Load a PEM (`PUBLIC KEY`) public key for `algorithm`.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` for non-ECDSA algorithms, `InvalidKey` if the
    /// key is malformed or on the wrong curve.
    pub fn from_pem(algorithm: Algorithm, pem: &[u8]) -> JwtResult<Self> {
        expect_family(algorithm, Family::Ecdsa)?;
        let pem = pem_str(pem)?;
        let key = match algorithm {
            Algorithm::ES256 => VerifyingKey::P256(
                p256::ecdsa::VerifyingKey::from_public_key_pem(pem)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
            _ => VerifyingKey::P384(
                p384::ecdsa::VerifyingKey::from_public_key_pem(pem)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
        };
        Ok(Self { algorithm, key })
    }

    /// Load a SEC1 encoded point (compressed or uncompressed) for `algorithm`.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` for non-ECDSA algorithms, `InvalidKey` if the
    /// point is not on the algorithm's curve.
    pub fn from_sec1_bytes(algorithm: Algorithm, point: &[u8]) -> JwtResult<Self> {
        expect_family(algorithm, Family::Ecdsa)?;
        let key = match algorithm {
            Algorithm::ES256 => VerifyingKey::P256(
                p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
            _ => VerifyingKey::P384(
                p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
                    .map_err(|e| wrong_curve(algorithm, e))?,
            ),
        };
        Ok(Self { algorithm, key })
    }

    /// Algorithm this key verifies.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl fmt::Debug for EcdsaVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaVerifier")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Verifier for EcdsaVerifier {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        self.key.verify(payload, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use rand_core::OsRng;

    fn p256_key() -> p256::ecdsa::SigningKey {
        p256::ecdsa::SigningKey::random(&mut OsRng)
    }

    fn p384_key() -> p384::ecdsa::SigningKey {
        p384::ecdsa::SigningKey::random(&mut OsRng)
    }

    #[test]
    fn es256_signatures_are_fixed_width_and_verify() {
        let signer = EcdsaSigner::es256(p256_key());
        let sig = signer.sign(b"header.claims").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(signer.verifier().verify(b"header.claims", &sig).is_ok());
        assert_eq!(
            signer.verifier().verify(b"header.claimz", &sig),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn es384_signatures_are_fixed_width_and_verify() {
        let signer = EcdsaSigner::es384(p384_key());
        let sig = signer.sign(b"header.claims").unwrap();
        assert_eq!(sig.len(), 96);
        assert!(Verifier::verify(&signer, b"header.claims", &sig).is_ok());
    }

    #[test]
    fn signing_is_deterministic() {
        let signer = EcdsaSigner::es256(p256_key());
        assert_eq!(signer.sign(b"p").unwrap(), signer.sign(b"p").unwrap());
    }

    #[test]
    fn other_key_does_not_verify() {
        let signer = EcdsaSigner::es256(p256_key());
        let other = EcdsaSigner::es256(p256_key());
        let sig = signer.sign(b"payload").unwrap();
        assert_eq!(
            other.verifier().verify(b"payload", &sig),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn der_signature_encoding_is_rejected() {
        let key = p256_key();
        let der_sig: p256::ecdsa::Signature =
            p256::ecdsa::signature::Signer::sign(&key, b"payload");
        let verifier = EcdsaVerifier::es256(key.verifying_key().clone());
        assert_eq!(
            verifier.verify(b"payload", der_sig.to_der().as_bytes()),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn loads_pkcs8_and_spki() {
        let key = p384_key();
        let der = key.to_pkcs8_der().unwrap();
        let signer = EcdsaSigner::from_pkcs8_der(Algorithm::ES384, der.as_bytes()).unwrap();

        let pem = key.verifying_key().to_public_key_pem(LineEnding::LF).unwrap();
        let verifier = EcdsaVerifier::from_pem(Algorithm::ES384, pem.as_bytes()).unwrap();

        let sig = signer.sign(b"payload").unwrap();
        assert!(verifier.verify(b"payload", &sig).is_ok());
    }

    #[test]
    fn loads_sec1_points() {
        let key = p256_key();
        let point = key.verifying_key().to_encoded_point(false);
        let verifier = EcdsaVerifier::from_sec1_bytes(Algorithm::ES256, point.as_bytes()).unwrap();
        let sig = EcdsaSigner::es256(key).sign(b"payload").unwrap();
        assert!(verifier.verify(b"payload", &sig).is_ok());
    }

    #[test]
    fn curve_digest_mismatch_is_invalid_key() {
        let p384_der = p384_key().to_pkcs8_der().unwrap();
        assert!(matches!(
            EcdsaSigner::from_pkcs8_der(Algorithm::ES256, p384_der.as_bytes()),
            Err(JwtError::InvalidKey(_))
        ));

        let p256_pem = p256_key()
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        assert!(matches!(
            EcdsaVerifier::from_pem(Algorithm::ES384, p256_pem.as_bytes()),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn non_ecdsa_algorithm_is_unsupported() {
        assert!(matches!(
            EcdsaVerifier::from_sec1_bytes(Algorithm::HS256, &[4u8; 65]),
            Err(JwtError::UnsupportedAlgorithm(_))
        ));
    }
}
