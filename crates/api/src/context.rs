//! Request-scoped identity.
//!
//! The auth middleware stores a [`Principal`] in the request extensions;
//! handlers receive it through [`CurrentPrincipal`].

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use storefront_auth::{Permission, Principal, require_admin, require_authenticated};

use crate::app::errors;

/// The authenticated caller of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPrincipal(pub Principal);

impl CurrentPrincipal {
    /// Admin guard for handlers that must reject callers before parsing input.
    pub fn require_admin(&self, permission: Permission) -> Result<(), Response> {
        require_admin(&self.0, permission).map_err(errors::authz_error_to_response)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_authenticated(parts.extensions.get::<Principal>())
            .map(|p| CurrentPrincipal(p.clone()))
            .map_err(errors::authz_error_to_response)
    }
}
