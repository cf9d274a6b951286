//! RSA algorithms: PKCS#1 v1.5 (RS256, RS384, RS512) and PSS (PS256, PS384, PS512)

use super::{Algorithm, Family, Signer, Verifier, expect_family};
use crate::error::{JwtError, JwtResult};
use ::rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use ::rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ::rsa::signature::{RandomizedSigner as _, SignatureEncoding as _, Signer as _};
use ::rsa::traits::PublicKeyParts;
use ::rsa::{RsaPrivateKey, RsaPublicKey, pkcs1v15, pss};
use rand_core::OsRng;
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;

/// Smallest modulus accepted for signing or verification.
pub const MIN_RSA_KEY_BITS: usize = 2048;

enum SigningKey {
    Rs256(pkcs1v15::SigningKey<Sha256>),
    Rs384(pkcs1v15::SigningKey<Sha384>),
    Rs512(pkcs1v15::SigningKey<Sha512>),
    Ps256(pss::SigningKey<Sha256>),
    Ps384(pss::SigningKey<Sha384>),
    Ps512(pss::SigningKey<Sha512>),
}

enum VerifyingKey {
    Rs256(pkcs1v15::VerifyingKey<Sha256>),
    Rs384(pkcs1v15::VerifyingKey<Sha384>),
    Rs512(pkcs1v15::VerifyingKey<Sha512>),
    Ps256(pss::VerifyingKey<Sha256>),
    Ps384(pss::VerifyingKey<Sha384>),
    Ps512(pss::VerifyingKey<Sha512>),
}

fn check_size(key: &impl PublicKeyParts) -> JwtResult<usize> {
    let bits = key.size() * 8;
    if bits < MIN_RSA_KEY_BITS {
        return Err(JwtError::invalid_key(format!(
            "RSA modulus is {bits} bits, at least {MIN_RSA_KEY_BITS} required"
        )));
    }
    Ok(bits)
}

fn pem_str(pem: &[u8]) -> JwtResult<&str> {
    std::str::from_utf8(pem).map_err(|_| JwtError::invalid_key("Invalid UTF-8 in PEM key"))
}

impl SigningKey {
    fn new(algorithm: Algorithm, key: RsaPrivateKey) -> JwtResult<Self> {
        Ok(match algorithm {
            Algorithm::RS256 => SigningKey::Rs256(pkcs1v15::SigningKey::new(key)),
            Algorithm::RS384 => SigningKey::Rs384(pkcs1v15::SigningKey::new(key)),
            Algorithm::RS512 => SigningKey::Rs512(pkcs1v15::SigningKey::new(key)),
            Algorithm::PS256 => SigningKey::Ps256(pss::SigningKey::new(key)),
            Algorithm::PS384 => SigningKey::Ps384(pss::SigningKey::new(key)),
            Algorithm::PS512 => SigningKey::Ps512(pss::SigningKey::new(key)),
            other => return Err(JwtError::UnsupportedAlgorithm(other.to_string())),
        })
    }

    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        let signature = match self {
            SigningKey::Rs256(k) => k.try_sign(payload).map(|s| s.to_vec()),
            SigningKey::Rs384(k) => k.try_sign(payload).map(|s| s.to_vec()),
            SigningKey::Rs512(k) => k.try_sign(payload).map(|s| s.to_vec()),
            SigningKey::Ps256(k) => k.try_sign_with_rng(&mut OsRng, payload).map(|s| s.to_vec()),
            SigningKey::Ps384(k) => k.try_sign_with_rng(&mut OsRng, payload).map(|s| s.to_vec()),
            SigningKey::Ps512(k) => k.try_sign_with_rng(&mut OsRng, payload).map(|s| s.to_vec()),
        };
        signature.map_err(JwtError::signing)
    }
}

impl VerifyingKey {
    fn new(algorithm: Algorithm, key: RsaPublicKey) -> JwtResult<Self> {
        Ok(match algorithm {
            Algorithm::RS256 => VerifyingKey::Rs256(pkcs1v15::VerifyingKey::new(key)),
            Algorithm::RS384 => VerifyingKey::Rs384(pkcs1v15::VerifyingKey::new(key)),
            Algorithm::RS512 => VerifyingKey::Rs512(pkcs1v15::VerifyingKey::new(key)),
            Algorithm::PS256 => VerifyingKey::Ps256(pss::VerifyingKey::new(key)),
            Algorithm::PS384 => VerifyingKey::Ps384(pss::VerifyingKey::new(key)),
            Algorithm::PS512 => VerifyingKey::Ps512(pss::VerifyingKey::new(key)),
            other => return Err(JwtError::UnsupportedAlgorithm(other.to_string())),
        })
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        let valid = match self {
            VerifyingKey::Rs256(k) => pkcs1v15_verify(k, payload, signature),
            VerifyingKey::Rs384(k) => pkcs1v15_verify(k, payload, signature),
            VerifyingKey::Rs512(k) => pkcs1v15_verify(k, payload, signature),
            VerifyingKey::Ps256(k) => pss_verify(k, payload, signature),
            VerifyingKey::Ps384(k) => pss_verify(k, payload, signature),
            VerifyingKey::Ps512(k) => pss_verify(k, payload, signature),
        };
        if valid {
            Ok(())
        } else {
            Err(JwtError::InvalidSignature)
        }
    }
}

fn pkcs1v15_verify<K>(key: &K, payload: &[u8], signature: &[u8]) -> bool
where
    K: ::rsa::signature::Verifier<pkcs1v15::Signature>,
{
    pkcs1v15::Signature::try_from(signature)
        .map(|sig| key.verify(payload, &sig).is_ok())
        .unwrap_or(false)
}

fn pss_verify<K>(key: &K, payload: &[u8], signature: &[u8]) -> bool
where
    K: ::rsa::signature::Verifier<pss::Signature>,
{
    pss::Signature::try_from(signature)
        .map(|sig| key.verify(payload, &sig).is_ok())
        .unwrap_or(false)
}

/// RSA private key bound to one RS*/PS* algorithm.
///
/// Signs, and verifies with the public half of the same key.
pub struct RsaSigner {
    algorithm: Algorithm,
    bits: usize,
    key: SigningKey,
    verifier: RsaVerifier,
}

impl RsaSigner {
    /// Bind a private key to an RSA `algorithm`.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` for non-RSA algorithms, `InvalidKey` for keys
    /// under [`MIN_RSA_KEY_BITS`].
    pub fn new(algorithm: Algorithm, key: RsaPrivateKey) -> JwtResult<Self> {
        expect_family(algorithm, Family::Rsa)?;
        let bits = check_size(&key)?;
        let verifier = RsaVerifier::new(algorithm, key.to_public_key())?;
        Ok(Self {
            algorithm,
            bits,
            key: SigningKey::new(algorithm, key)?,
            verifier,
        })
    }

    /// Load a PKCS#8 DER private key.
    ///
    /// # Errors
    /// `InvalidKey` if the DER does not hold a usable RSA private key.
    pub fn from_pkcs8_der(algorithm: Algorithm, der: &[u8]) -> JwtResult<Self> {
        let key = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| JwtError::invalid_key(format!("Invalid RSA private key: {e}")))?;
        Self::new(algorithm, key)
    }

    /// Load a PEM private key, either `PRIVATE KEY` (PKCS#8) or
    /// `RSA PRIVATE KEY` (PKCS#1).
    ///
    /// # Errors
    /// `InvalidKey` if the PEM does not hold a usable RSA private key.
    pub fn from_pem(algorithm: Algorithm, pem: &[u8]) -> JwtResult<Self> {
        let pem = pem_str(pem)?;
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| JwtError::invalid_key(format!("Invalid RSA private key PEM: {e}")))?;
        Self::new(algorithm, key)
    }

    /// Load a PKCS#1 DER private key.
    ///
    /// # Errors
    /// `InvalidKey` if the DER does not hold a usable RSA private key.
    pub fn from_pkcs1_der(algorithm: Algorithm, der: &[u8]) -> JwtResult<Self> {
        let key = RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|e| JwtError::invalid_key(format!("Invalid RSA private key: {e}")))?;
        Self::new(algorithm, key)
    }

    /// Algorithm this key signs with.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Verifier for the public half of this key.
    #[must_use]
    pub fn verifier(&self) -> &RsaVerifier {
        &self.verifier
    }
}

impl fmt::Debug for RsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSigner")
            .field("algorithm", &self.algorithm)
            .field("bits", &self.bits)
            .finish_non_exhaustive()
    }
}

impl Signer for RsaSigner {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn sign(&self, payload: &[u8]) -> JwtResult<Vec<u8>> {
        self.key.sign(payload)
    }
}

impl Verifier for RsaSigner {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> JwtResult<()> {
        self.verifier.key.verify(payload, signature)
    }
}

/// RSA public key bound to one RS*/PS* algorithm.
pub struct RsaVerifier {
    algorithm: Algorithm,
    bits: usize,
    key: VerifyingKey,
}

impl RsaVerifier {
    /// Bind a public key to an RSA `algorithm`.
    ///
    /// # Errors
    /// `UnsupportedAlgorithm` for non-RSA algorithms, `InvalidKey` for keys
    /// under [`MIN_RSA_KEY_BITS`].
    pub fn new(algorithm: Algorithm, key: RsaPublicKey) -> JwtResult<Self> {
        expect_family(algorithm, Family::Rsa)?;
        let bits = check_size(&key)?;
        Ok(Self {
            algorithm,
            bits,
            key: VerifyingKey::new(algorithm, key)?,
        })
    }

    /// Load a DER `SubjectPublicKeyInfo`.
    ///
    /// # Errors
    /// `InvalidKey` if the DER does not hold an RSA public key.
    pub fn from_public_key_der(algorithm: Algorithm, der: &[u8]) -> JwtResult<Self> {
        let key = RsaPublicKey::from_public_key_der(der)
            .map_err(|e| JwtError::invalid_key(format!("Invalid RSA public key: {e}")))?;
        Self::new(algorithm, key)
    }

    /// Load a PEM public key, either `PUBLIC KEY` (SPKI) or
    /// `RSA PUBLIC KEY` (PKCS#1).
    ///
    /// # Errors
    /// `InvalidKey` if the PEM does not hold an RSA public key.
    pub fn from_pem(algorithm: Algorithm, pem: &[u8]) -> JwtResult<Self> {
        let pem = pem_str(pem)?;
        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| JwtError::invalid_key(format!("Invalid RSA public key PEM: {e}")))?;
        Self::new(algorithm, key)
    }

    /// Load a PKCS#1 DER public key.
    ///
    /// # Errors
    /// `InvalidKey` if the DER does not hold an RSA public key.
    pub fn from_pkcs1_der(algorithm: Algorithm, der: &[u8]) -> JwtResult<Self> {
        let key = RsaPublicKey::from_pkcs1_der(der)
            .map_err(|e| JwtError::invalid_key(format!("Invalid RSA public key: {e}")))?;
        Self::new(algorithm, key)
    }

    /// Algorithm this key verifies.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl fmt::Debug for RsaVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaVerifier")
            .field("algorithm", &self.algorithm)
            .field("bits", &self.bits)
            .finish_non_exhaustive()
    }
}

impl Verifier for RsaVerifier {
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
    use ::rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use once_cell::sync::Lazy;

    static KEY: Lazy<RsaPrivateKey> =
        Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 2048).expect("generate RSA key"));

    #[test]
    fn every_padding_and_digest_round_trips() {
        for alg in [
            Algorithm::RS256,
            Algorithm::RS384,
            Algorithm::RS512,
            Algorithm::PS256,
            Algorithm::PS384,
            Algorithm::PS512,
        ] {
            let signer = RsaSigner::new(alg, KEY.clone()).unwrap();
            let sig = signer.sign(b"header.claims").unwrap();
            assert_eq!(sig.len(), 256, "{alg}");
            assert!(signer.verifier().verify(b"header.claims", &sig).is_ok(), "{alg}");
            assert_eq!(
                signer.verifier().verify(b"header.claimz", &sig),
                Err(JwtError::InvalidSignature),
                "{alg}"
            );
        }
    }

    #[test]
    fn pkcs1v15_is_deterministic_and_pss_is_not() {
        let rs = RsaSigner::new(Algorithm::RS256, KEY.clone()).unwrap();
        assert_eq!(rs.sign(b"p").unwrap(), rs.sign(b"p").unwrap());

        let ps = RsaSigner::new(Algorithm::PS256, KEY.clone()).unwrap();
        assert_ne!(ps.sign(b"p").unwrap(), ps.sign(b"p").unwrap());
    }

    #[test]
    fn padding_schemes_do_not_cross_verify() {
        let rs = RsaSigner::new(Algorithm::RS256, KEY.clone()).unwrap();
        let ps = RsaVerifier::new(Algorithm::PS256, KEY.to_public_key()).unwrap();
        let sig = rs.sign(b"payload").unwrap();
        assert_eq!(ps.verify(b"payload", &sig), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn loads_der_and_pem() {
        let der = KEY.to_pkcs8_der().unwrap();
        let signer = RsaSigner::from_pkcs8_der(Algorithm::RS384, der.as_bytes()).unwrap();

        let pem = KEY.to_public_key().to_public_key_pem(LineEnding::LF).unwrap();
        let verifier = RsaVerifier::from_pem(Algorithm::RS384, pem.as_bytes()).unwrap();

        let sig = signer.sign(b"payload").unwrap();
        assert!(verifier.verify(b"payload", &sig).is_ok());

        let private_pem = KEY.to_pkcs8_pem(LineEnding::LF).unwrap();
        assert!(RsaSigner::from_pem(Algorithm::PS512, private_pem.as_bytes()).is_ok());
    }

    #[test]
    fn garbage_key_material_is_invalid_key() {
        assert!(matches!(
            RsaSigner::from_pkcs8_der(Algorithm::RS256, b"not a key"),
            Err(JwtError::InvalidKey(_))
        ));
        assert!(matches!(
            RsaVerifier::from_public_key_der(Algorithm::RS256, &[0x30, 0x00]),
            Err(JwtError::InvalidKey(_))
        ));
        assert!(matches!(
            RsaVerifier::from_pem(Algorithm::RS256, &[0xff, 0xfe]),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn short_modulus_is_invalid_key() {
        let small = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        assert!(matches!(
            RsaSigner::new(Algorithm::RS256, small.clone()),
            Err(JwtError::InvalidKey(_))
        ));
        assert!(matches!(
            RsaVerifier::new(Algorithm::RS256, small.to_public_key()),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn non_rsa_algorithm_is_unsupported() {
        assert!(matches!(
            RsaSigner::new(Algorithm::ES256, KEY.clone()),
            Err(JwtError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn malformed_signature_bytes_are_invalid_signature() {
        let verifier = RsaVerifier::new(Algorithm::RS256, KEY.to_public_key()).unwrap();
        assert_eq!(verifier.verify(b"payload", &[]), Err(JwtError::InvalidSignature));
        assert_eq!(verifier.verify(b"payload", &[0u8; 7]), Err(JwtError::InvalidSignature));
    }
}
