//! Compact JSON Web Token issuance and verification.
//!
//! This crate provides:
//! - HMAC (HS256/384/512), RSA PKCS#1 v1.5 (RS256/384/512), RSA-PSS
//!   (PS256/384/512) and ECDSA (ES256/ES384) keys
//! - A [`Builder`] that signs any `Serialize` claims into a [`Token`]
//! - A [`Parser`] that verifies a token string with a single trusted key
//! - [`StandardClaims`] for the registered claims, plus opt-in
//!   [`ValidationOptions`] for expiry, issuer and audience checks
//!
//! ```
//! use jwtkit::{Builder, HmacKey, Parser, StandardClaims};
//!
//! let key = HmacKey::hs256(b"secret".to_vec())?;
//! let token = Builder::new(key.clone()).build(&StandardClaims::new().subject("user-1"))?;
//!
//! let (_, claims) = Parser::new(key).parse_claims::<StandardClaims>(token.raw())?;
//! assert!(claims.is_subject("user-1"));
//! # Ok::<(), jwtkit::JwtError>(())
//! ```
//!
//! Keys are bound to one algorithm when constructed. A parser only accepts
//! tokens whose header names its key's algorithm, so the header can never
//! downgrade verification to a weaker scheme or to `none`.

mod algorithm;
mod builder;
mod claims;
mod codec;
mod error;
mod header;
mod parser;
mod token;
mod validation;

pub use algorithm::{
    Algorithm, EcdsaSigner, EcdsaVerifier, Family, HmacKey, MIN_RSA_KEY_BITS, RsaSigner,
    RsaVerifier, Signer, Verifier,
};
pub use builder::Builder;
pub use claims::{Audience, StandardClaims};
pub use codec::{decode_segment, encode_segment};
pub use error::{JwtError, JwtResult, Segment};
pub use header::{Header, TOKEN_TYPE};
pub use parser::{Parser, parse, parse_claims, peek_header};
pub use token::Token;
pub use validation::ValidationOptions;
