use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::UserId;

use crate::{Principal, Role};

/// Access token claims (transport-agnostic).
///
/// Timestamps are Unix seconds so the token stays a standard JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the account id.
    pub sub: UserId,
    pub username: String,
    pub role: Role,
    /// Issued-at.
    pub iat: i64,
    /// Expiration.
    pub exp: i64,
}

impl JwtClaims {
    pub fn for_principal(principal: &Principal, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: principal.user_id,
            username: principal.username.clone(),
            role: principal.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, self.username.clone(), self.role)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate a token's time window against `now`.
///
/// Signature verification happens before this, in [`crate::jwt`].
pub fn validate_claims(iat: i64, exp: i64, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if exp <= iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
