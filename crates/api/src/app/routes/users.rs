//! User administration (admin only).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
};

use storefront_auth::Permission;
use storefront_core::UserId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::CurrentPrincipal;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", delete(delete_user))
        .route("/:id/rol", put(update_role))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> axum::response::Response {
    match services.accounts.list_users(&principal).await {
        Ok(users) => {
            let items: Vec<_> = users.iter().map(dto::user_to_json).collect();
            (StatusCode::OK, Json(serde_json::Value::Array(items))).into_response()
        }
        Err(e) => errors::account_error_to_response(e),
    }
}

/// PUT /usuarios/:id/rol
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    caller: CurrentPrincipal,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateRoleRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = caller.require_admin(Permission::UsersManage) {
        return denied;
    }
    let CurrentPrincipal(principal) = caller;
    let Ok(user_id) = id.parse::<UserId>() else {
        return errors::invalid_id();
    };
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    match services
        .accounts
        .update_role(&principal, user_id, body.role.trim())
        .await
    {
        Ok(role) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "mensaje": "Rol actualizado exitosamente",
                "usuario_id": user_id.to_string(),
                "nuevo_rol": role.as_str(),
            })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /usuarios/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    caller: CurrentPrincipal,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = caller.require_admin(Permission::UsersManage) {
        return denied;
    }
    let CurrentPrincipal(principal) = caller;
    let Ok(user_id) = id.parse::<UserId>() else {
        return errors::invalid_id();
    };
    match services.accounts.delete_user(&principal, user_id).await {
        Ok(username) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "mensaje": "Usuario eliminado exitosamente",
                "usuario_eliminado": username,
            })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}
