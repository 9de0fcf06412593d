use serde::{Deserialize, Serialize};

use storefront_core::UserId;

use crate::Role;

/// Authenticated caller, scoped to a single request.
///
/// Built by the transport layer from a verified token and passed explicitly
/// into every core call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
