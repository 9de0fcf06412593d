//! Guard functions, invoked at the start of each handler/service call.
//!
//! - No IO
//! - No panics
//! - No business logic (pure policy check)

use thiserror::Error;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),
}

/// Require that the request carries an authenticated principal.
pub fn require_authenticated(principal: Option<&Principal>) -> Result<&Principal, AuthzError> {
    principal.ok_or(AuthzError::Unauthenticated)
}

/// Check that the principal's role grants `required`.
pub fn authorize(principal: &Principal, required: Permission) -> Result<(), AuthzError> {
    if principal.role.grants(required) {
        Ok(())
    } else {
        tracing::debug!(
            user = %principal.username,
            role = %principal.role,
            permission = %required,
            "authorization denied"
        );
        Err(AuthzError::Forbidden(required))
    }
}

/// Require the administrator role for an admin-only permission.
pub fn require_admin(principal: &Principal, required: Permission) -> Result<(), AuthzError> {
    if principal.role != Role::Admin {
        return Err(AuthzError::Forbidden(required));
    }
    authorize(principal, required)
}
