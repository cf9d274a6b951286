//! Claim validation options.
//!
//! Signature verification never looks at time or audience. Callers that
//! want those checks run them on the decoded [`StandardClaims`] after
//! parsing:
//!
//! ```
//! use jwtkit::{HmacKey, Parser, StandardClaims, ValidationOptions};
//! # use jwtkit::Builder;
//! # let key = HmacKey::hs256(b"secret".to_vec())?;
//! # let raw = Builder::new(key.clone())
//! #     .build(&StandardClaims::new().issuer("auth").expires_in(chrono::Duration::minutes(5)))?
//! #     .into_raw();
//!
//! let (_, claims) = Parser::new(key).parse_claims::<StandardClaims>(&raw)?;
//! claims.validate(&ValidationOptions::default().expect_issuer("auth"))?;
//! # Ok::<(), jwtkit::JwtError>(())
//! ```

use crate::claims::StandardClaims;
use crate::error::{JwtError, JwtResult};
use chrono::{DateTime, Duration, Utc};

/// JWT validation options.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Leeway for time-based claims.
    pub leeway: Duration,
    /// Validate expiry.
    pub validate_exp: bool,
    /// Validate not-before.
    pub validate_nbf: bool,
    /// Registered claims that must be present, by name (`"exp"`, `"sub"`, ...).
    pub required_claims: Vec<String>,
    /// Expected issuer.
    pub expected_issuer: Option<String>,
    /// Accepted audiences; the token must name at least one.
    pub expected_audience: Option<Vec<String>>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            leeway: Duration::seconds(60),
            validate_exp: true,
            validate_nbf: true,
            required_claims: vec![],
            expected_issuer: None,
            expected_audience: None,
        }
    }
}

impl ValidationOptions {
    /// Create validation options that skip all validation.
    ///
    /// Only for tests and tooling that inspect already-trusted tokens.
    #[must_use]
    pub fn insecure_for_testing() -> Self {
        Self {
            leeway: Duration::zero(),
            validate_exp: false,
            validate_nbf: false,
            ..Self::default()
        }
    }

    /// Create strict validation options with no leeway that require `exp`.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            leeway: Duration::zero(),
            required_claims: vec!["exp".to_string()],
            ..Self::default()
        }
    }

    /// Set the time leeway for validation.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Set whether to validate expiration.
    #[must_use]
    pub fn validate_expiration(mut self, validate: bool) -> Self {
        self.validate_exp = validate;
        self
    }

    /// Set whether to validate not-before.
    #[must_use]
    pub fn validate_not_before(mut self, validate: bool) -> Self {
        self.validate_nbf = validate;
        self
    }

    /// Add a required claim.
    #[must_use]
    pub fn require_claim(mut self, claim: impl Into<String>) -> Self {
        self.required_claims.push(claim.into());
        self
    }

    /// Set expected issuer.
    #[must_use]
    pub fn expect_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    /// Set expected audience.
    #[must_use]
    pub fn expect_audience<I, S>(mut self, audience: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_audience = Some(audience.into_iter().map(Into::into).collect());
        self
    }
}

impl StandardClaims {
    /// Check these claims against `options` at the current time.
    ///
    /// # Errors
    /// See [`validate_at`](Self::validate_at).
    pub fn validate(&self, options: &ValidationOptions) -> JwtResult<()> {
        self.validate_at(options, Utc::now())
    }

    /// Check these claims against `options` as of `now`.
    ///
    /// Checks run in order: required claims, expiry, not-before, issuer,
    /// audience.
    ///
    /// # Errors
    /// `MissingClaim`, `TokenExpired`, `TokenNotYetValid`, `InvalidIssuer` or
    /// `InvalidAudience`.
    pub fn validate_at(&self, options: &ValidationOptions, now: DateTime<Utc>) -> JwtResult<()> {
        for name in &options.required_claims {
            if !self.has_claim(name) {
                return Err(JwtError::MissingClaim(name.clone()));
            }
        }

        let now = now.timestamp();
        let leeway = options.leeway.num_seconds().max(0);

        if options.validate_exp {
            if let Some(exp) = self.exp {
                if now >= exp.saturating_add(leeway) {
                    return Err(JwtError::TokenExpired);
                }
            }
        }

        if options.validate_nbf {
            if let Some(nbf) = self.nbf {
                if now < nbf.saturating_sub(leeway) {
                    return Err(JwtError::TokenNotYetValid);
                }
            }
        }

        if let Some(issuer) = &options.expected_issuer {
            if !self.is_issuer(issuer) {
                return Err(JwtError::InvalidIssuer);
            }
        }

        if let Some(audiences) = &options.expected_audience {
            if !audiences.iter().any(|aud| self.is_for_audience(aud)) {
                return Err(JwtError::InvalidAudience);
            }
        }

        Ok(())
    }

    fn has_claim(&self, name: &str) -> bool {
        match name {
            "aud" => !self.aud.is_empty(),
            "exp" => self.exp.is_some(),
            "jti" => self.jti.is_some(),
            "iat" => self.iat.is_some(),
            "iss" => self.iss.is_some(),
            "nbf" => self.nbf.is_some(),
            "sub" => self.sub.is_some(),
            _ => false,
        }
    }
}
