//! Signed, time-limited password reset tokens.
//!
//! The token carries the account email and a fixed purpose claim, so access
//! tokens and reset tokens are never interchangeable.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::jwt::signature_validation;
use crate::{TokenError, validate_claims};

pub const PASSWORD_RESET_PURPOSE: &str = "password-reset";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ResetClaims {
    sub: String,
    purpose: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct ResetTokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    max_age: Duration,
}

impl ResetTokenSigner {
    pub fn new(secret: &[u8], max_age: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            max_age,
        }
    }

    pub fn issue(&self, email: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = ResetClaims {
            sub: email.to_string(),
            purpose: PASSWORD_RESET_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.max_age).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Returns the email the token was issued for.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let data = jsonwebtoken::decode::<ResetClaims>(token, &self.decoding, &signature_validation())
            .map_err(|e| TokenError::Decode(e.to_string()))?;
        if data.claims.purpose != PASSWORD_RESET_PURPOSE {
            return Err(TokenError::Decode("wrong token purpose".to_string()));
        }
        validate_claims(data.claims.iat, data.claims.exp, now)?;
        Ok(data.claims.sub)
    }
}

impl core::fmt::Debug for ResetTokenSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResetTokenSigner")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}
