use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use storefront_auth::JwtValidator;

use crate::app::errors;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Turn a valid `Authorization: Bearer` token into a request-scoped
/// `Principal`. Missing or invalid tokens are rejected with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Debes iniciar sesión");
    };

    let claims = match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "bearer token rejected");
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Sesión inválida o expirada",
            );
        }
    };

    req.extensions_mut().insert(claims.principal());

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
