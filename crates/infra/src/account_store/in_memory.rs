use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use storefront_accounts::{AccountStore, AccountStoreError, User};
use storefront_auth::Role;
use storefront_core::UserId;

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    users: RwLock<BTreeMap<UserId, User>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<UserId, User>>, AccountStoreError> {
        self.users
            .read()
            .map_err(|_| AccountStoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<UserId, User>>, AccountStoreError> {
        self.users
            .write()
            .map_err(|_| AccountStoreError::Unavailable("lock poisoned".to_string()))
    }

    fn find(&self, matches: impl Fn(&User) -> bool) -> Result<Option<User>, AccountStoreError> {
        Ok(self.read()?.values().find(|u| matches(u)).cloned())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, user: User) -> Result<User, AccountStoreError> {
        let mut users = self.write()?;
        if users.values().any(|u| u.email == user.email) {
            return Err(AccountStoreError::DuplicateEmail(user.email));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(AccountStoreError::DuplicateUsername(user.username));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, AccountStoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AccountStoreError> {
        self.find(|u| u.username == username)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountStoreError> {
        self.find(|u| u.email == email)
    }

    async fn list(&self) -> Result<Vec<User>, AccountStoreError> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<bool, AccountStoreError> {
        Ok(match self.write()?.get_mut(&id) {
            Some(user) => {
                user.role = role;
                true
            }
            None => false,
        })
    }

    async fn set_password_hash(&self, email: &str, hash: String) -> Result<bool, AccountStoreError> {
        let mut users = self.write()?;
        Ok(match users.values_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = hash;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: UserId) -> Result<bool, AccountStoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }
}
