use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::{errors, services::AppServices};
use crate::context::CurrentPrincipal;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /mi-perfil
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> axum::response::Response {
    match services.accounts.profile(&principal).await {
        Ok(user) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "usuario": user.username,
                "email": user.email,
                "role": user.role.as_str(),
            })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}
