//! Signed session and email tokens.
//!
//! Every token is an HMAC-signed JWT whose `sub` is the account email and
//! whose `scope` claim names its purpose. A token minted for one purpose is
//! never accepted for another. Expiry is checked against the injected
//! [`Clock`] rather than the system time so tests can move "now".

use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::user::EmailAddress;

/// Purpose carried in the `scope` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    AccessToken,
    RefreshToken,
    EmailVerification,
    PasswordReset,
}

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub scope: TokenScope,
}

/// Lifetimes per token family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    pub access: TimeDelta,
    pub refresh: TimeDelta,
    pub email: TimeDelta,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: TimeDelta::minutes(15),
            refresh: TimeDelta::days(7),
            email: TimeDelta::days(7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("algorithm {0:?} is not an HMAC algorithm")]
    UnsupportedAlgorithm(Algorithm),
    #[error("token encoding failed: {0}")]
    Encoding(String),
    #[error("token is malformed or has a bad signature")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("token scope {actual:?} does not match {expected:?}")]
    WrongScope {
        expected: TokenScope,
        actual: TokenScope,
    },
}

/// Access and refresh tokens issued together on login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies scoped JWTs.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    ttls: TokenTtls,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Build a service from a shared secret.
    ///
    /// Only the HMAC family (`HS256`, `HS384`, `HS512`) is accepted.
    pub fn new(
        secret: &[u8],
        algorithm: Algorithm,
        ttls: TokenTtls,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(TokenError::UnsupportedAlgorithm(algorithm));
        }
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            header: Header::new(algorithm),
            validation,
            ttls,
            clock,
        })
    }

    pub fn issue_access(&self, email: &EmailAddress) -> Result<String, TokenError> {
        self.issue(email, TokenScope::AccessToken, self.ttls.access)
    }

    pub fn issue_refresh(&self, email: &EmailAddress) -> Result<String, TokenError> {
        self.issue(email, TokenScope::RefreshToken, self.ttls.refresh)
    }

    pub fn issue_pair(&self, email: &EmailAddress) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access(email)?,
            refresh_token: self.issue_refresh(email)?,
        })
    }

    pub fn issue_email_verification(&self, email: &EmailAddress) -> Result<String, TokenError> {
        self.issue(email, TokenScope::EmailVerification, self.ttls.email)
    }

    pub fn issue_password_reset(&self, email: &EmailAddress) -> Result<String, TokenError> {
        self.issue(email, TokenScope::PasswordReset, self.ttls.email)
    }

    fn issue(
        &self,
        email: &EmailAddress,
        scope: TokenScope,
        ttl: TimeDelta,
    ) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            scope,
        };
        jsonwebtoken::encode(&self.header, &claims, &self.encoding_key)
            .map_err(|err| TokenError::Encoding(err.to_string()))
    }

    /// Verify signature, expiry and scope, returning the claims.
    pub fn decode(&self, token: &str, expected: TokenScope) -> Result<Claims, TokenError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)?;
        if claims.scope != expected {
            return Err(TokenError::WrongScope {
                expected,
                actual: claims.scope,
            });
        }
        if self.clock.utc().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    pub fn decode_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode(token, TokenScope::AccessToken)
    }

    pub fn decode_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode(token, TokenScope::RefreshToken)
    }

    pub fn decode_email_verification(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode(token, TokenScope::EmailVerification)
    }

    pub fn decode_password_reset(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode(token, TokenScope::PasswordReset)
    }
}
