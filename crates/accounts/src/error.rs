use thiserror::Error;

use storefront_auth::{AuthzError, PasswordError, TokenError};
use storefront_core::DomainError;

use crate::AccountStoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    #[error("invalid role '{0}'")]
    InvalidRole(String),

    #[error("you cannot delete your own account")]
    SelfDeletion,

    #[error("reset link has expired or is invalid")]
    InvalidResetToken,

    #[error(transparent)]
    Authorization(#[from] AuthzError),

    #[error("token error: {0}")]
    Token(TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(AccountStoreError),
}

impl From<AccountStoreError> for AccountError {
    fn from(value: AccountStoreError) -> Self {
        match value {
            AccountStoreError::DuplicateEmail(e) => AccountError::DuplicateEmail(e),
            AccountStoreError::DuplicateUsername(u) => AccountError::DuplicateUsername(u),
            other => AccountError::Store(other),
        }
    }
}

impl From<TokenError> for AccountError {
    fn from(value: TokenError) -> Self {
        AccountError::Token(value)
    }
}
