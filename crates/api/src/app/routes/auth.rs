//! Public account endpoints: registration, login and password recovery.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/recuperar-contrasena", post(request_password_reset))
        .route("/restablecer-contrasena", post(reset_password))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    match services.accounts.register(body.into()).await {
        Ok(session) => (StatusCode::CREATED, Json(dto::session_to_json(&session))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    match services.accounts.login(body.usuario.trim(), &body.contrasena).await {
        Ok(session) => (StatusCode::OK, Json(dto::session_to_json(&session))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn request_password_reset(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::PasswordResetRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    match services.accounts.request_password_reset(body.email.trim()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "mensaje": "Se ha enviado un enlace de recuperación a tu email",
            })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::NewPasswordRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    match services
        .accounts
        .reset_password(body.token.trim(), &body.nueva_contrasena)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "mensaje": "Tu contraseña ha sido actualizada exitosamente",
            })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}
