//! Claim decoding and validation errors after a signature has verified

use chrono::{Duration, Utc};
use jwtkit::{Audience, Builder, HmacKey, JwtError, Parser, StandardClaims, ValidationOptions};
use serde::Deserialize;

fn key() -> HmacKey {
    HmacKey::hs256(b"claims-secret".to_vec()).unwrap()
}

fn issue(claims: &StandardClaims) -> String {
    Builder::new(key()).build(claims).unwrap().into_raw()
}

fn parse(raw: &str) -> StandardClaims {
    Parser::new(key())
        .parse_claims::<StandardClaims>(raw)
        .unwrap()
        .1
}

#[test]
fn test_expired_token_still_verifies_but_fails_validation() {
    let raw = issue(&StandardClaims::new().expires_at(Utc::now() - Duration::hours(1)));

    // Parsing never checks time
    let claims = parse(&raw);
    assert_eq!(
        claims.validate(&ValidationOptions::default()),
        Err(JwtError::TokenExpired)
    );
    assert_eq!(
        claims.validate(&ValidationOptions::default().validate_expiration(false)),
        Ok(())
    );
}

#[test]
fn test_leeway_covers_clock_skew() {
    let raw = issue(&StandardClaims::new().not_before(Utc::now() + Duration::seconds(20)));
    let claims = parse(&raw);

    assert_eq!(claims.validate(&ValidationOptions::default()), Ok(()));
    assert_eq!(
        claims.validate(&ValidationOptions::default().with_leeway(Duration::zero())),
        Err(JwtError::TokenNotYetValid)
    );
}

#[test]
fn test_issuer_and_audience_expectations() {
    let raw = issue(
        &StandardClaims::new()
            .issuer("auth.example")
            .audience(Audience::new(["web", "mobile"]))
            .expires_in(Duration::minutes(10)),
    );
    let claims = parse(&raw);

    let ok = ValidationOptions::strict()
        .expect_issuer("auth.example")
        .expect_audience(["mobile"]);
    assert_eq!(claims.validate(&ok), Ok(()));

    assert_eq!(
        claims.validate(&ValidationOptions::default().expect_issuer("evil.example")),
        Err(JwtError::InvalidIssuer)
    );
    assert_eq!(
        claims.validate(&ValidationOptions::default().expect_audience(["admin"])),
        Err(JwtError::InvalidAudience)
    );
}

#[test]
fn test_claims_of_wrong_shape_are_malformed() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct NeedsEmail {
        email: String,
    }

    let raw = issue(&StandardClaims::new().subject("no-email"));
    let err = Parser::new(key())
        .parse_claims::<NeedsEmail>(&raw)
        .unwrap_err();
    assert!(matches!(err, JwtError::MalformedClaims(_)));
    assert!(err.is_malformed());

    // The same token is fine when only the signature matters
    assert!(Parser::new(key()).parse(&raw).is_ok());
}

#[test]
fn test_typed_claims_from_token() {
    let token = Builder::new(key())
        .build(&StandardClaims::new().jwt_id("abc").subject("u1"))
        .unwrap();
    let claims: StandardClaims = token.claims().unwrap();
    assert!(claims.is_id("abc"));
    assert!(claims.is_subject("u1"));
    assert!(matches!(
        token.claims::<Vec<String>>(),
        Err(JwtError::MalformedClaims(_))
    ));
}
