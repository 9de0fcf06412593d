use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_auth::Role;
use storefront_core::UserId;

use crate::User;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountStoreError {
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `DuplicateEmail`/`DuplicateUsername` on collisions.
    async fn insert(&self, user: User) -> Result<User, AccountStoreError>;
    async fn get(&self, id: UserId) -> Result<Option<User>, AccountStoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AccountStoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountStoreError>;
    async fn list(&self) -> Result<Vec<User>, AccountStoreError>;
    /// Returns `false` if no account matched.
    async fn set_role(&self, id: UserId, role: Role) -> Result<bool, AccountStoreError>;
    /// Returns `false` if no account matched.
    async fn set_password_hash(&self, email: &str, hash: String) -> Result<bool, AccountStoreError>;
    /// Returns `false` if no account matched.
    async fn delete(&self, id: UserId) -> Result<bool, AccountStoreError>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn insert(&self, user: User) -> Result<User, AccountStoreError> {
        (**self).insert(user).await
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, AccountStoreError> {
        (**self).get(id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AccountStoreError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountStoreError> {
        (**self).find_by_email(email).await
    }

    async fn list(&self) -> Result<Vec<User>, AccountStoreError> {
        (**self).list().await
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<bool, AccountStoreError> {
        (**self).set_role(id, role).await
    }

    async fn set_password_hash(&self, email: &str, hash: String) -> Result<bool, AccountStoreError> {
        (**self).set_password_hash(email, hash).await
    }

    async fn delete(&self, id: UserId) -> Result<bool, AccountStoreError> {
        (**self).delete(id).await
    }
}
