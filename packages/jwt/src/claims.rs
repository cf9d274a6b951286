//! Registered claims (RFC 7519 section 4.1)
//!
//! [`StandardClaims`] carries only the registered fields. Applications
//! embed it in their own claims type with `#[serde(flatten)]`:
//!
//! ```
//! use jwtkit::StandardClaims;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct UserClaims {
//!     #[serde(flatten)]
//!     standard: StandardClaims,
//!     is_admin: bool,
//!     email: String,
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The `aud` claim.
///
/// Encodes as a bare string when it holds exactly one value and as an array
/// otherwise; decodes from either form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audience(Vec<String>);

impl Audience {
    /// Audience with the given values, in order.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// True when no audience is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `audience` is one of the values.
    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        self.0.iter().any(|a| a == audience)
    }

    /// Values in order
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for Audience {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for Audience {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for Audience {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<S: Into<String>> FromIterator<S> for Audience {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            values => values.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(value) => Self(vec![value]),
            OneOrMany::Many(values) => Self(values),
        })
    }
}

/// Registered claims, each omitted from JSON when unset.
///
/// Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardClaims {
    /// Audience (`aud`)
    #[serde(default, skip_serializing_if = "Audience::is_empty")]
    pub aud: Audience,
    /// Expiration time (`exp`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Token identifier (`jti`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Issued at (`iat`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Issuer (`iss`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Not before (`nbf`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Subject (`sub`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

impl StandardClaims {
    /// Empty claims.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the audience (aud) claim.
    #[must_use]
    pub fn audience(mut self, aud: impl Into<Audience>) -> Self {
        self.aud = aud.into();
        self
    }

    /// Set the expiration time relative to now.
    ///
    /// Saturates at the latest (or earliest) representable time instead of
    /// overflowing.
    #[must_use]
    pub fn expires_in(mut self, dur: Duration) -> Self {
        let at = Utc::now().checked_add_signed(dur).unwrap_or(if dur < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        self.exp = Some(at.timestamp());
        self
    }

    /// Set an absolute expiration time.
    #[must_use]
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.exp = Some(at.timestamp());
        self
    }

    /// Set the JWT ID (jti) claim.
    #[must_use]
    pub fn jwt_id(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// Set the issued-at time to now.
    #[must_use]
    pub fn issued_now(mut self) -> Self {
        self.iat = Some(Utc::now().timestamp());
        self
    }

    /// Set the issuer (iss) claim.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set the not-before (nbf) claim.
    #[must_use]
    pub fn not_before(mut self, nbf: DateTime<Utc>) -> Self {
        self.nbf = Some(nbf.timestamp());
        self
    }

    /// Set the subject (sub) claim.
    #[must_use]
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// True when `audience` is among the `aud` values.
    #[must_use]
    pub fn is_for_audience(&self, audience: &str) -> bool {
        self.aud.contains(audience)
    }

    /// True when `iss` equals `issuer`.
    #[must_use]
    pub fn is_issuer(&self, issuer: &str) -> bool {
        self.iss.as_deref() == Some(issuer)
    }

    /// True when `sub` equals `subject`.
    #[must_use]
    pub fn is_subject(&self, subject: &str) -> bool {
        self.sub.as_deref() == Some(subject)
    }

    /// True when `jti` equals `id`.
    #[must_use]
    pub fn is_id(&self, id: &str) -> bool {
        self.jti.as_deref() == Some(id)
    }

    /// True when `exp` is set and `now` is on or after it.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| now.timestamp() >= exp)
    }

    /// True when not expired, past `nbf` and not issued in the future, all
    /// relative to `now` and without leeway.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let now_ts = now.timestamp();
        !self.is_expired_at(now)
            && self.nbf.map_or(true, |nbf| nbf <= now_ts)
            && self.iat.map_or(true, |iat| iat <= now_ts)
    }
}
