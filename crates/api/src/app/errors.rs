use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_accounts::AccountError;
use storefront_auth::AuthzError;
use storefront_inventory::{AdminError, CatalogError, CheckoutError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Body was missing, not JSON, or did not match the expected shape.
pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn invalid_id() -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", "ID inválido")
}

/// Log the detail server-side; the client only gets a generic message.
fn internal(detail: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!(error = %detail, "request failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Error interno del servidor",
    )
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Debes iniciar sesión")
        }
        AuthzError::Forbidden(_) => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Acceso denegado. Se requieren permisos de administrador",
        ),
    }
}

pub fn checkout_error_to_response(err: CheckoutError) -> axum::response::Response {
    match err {
        CheckoutError::Authorization(e) => authz_error_to_response(e),
        CheckoutError::EmptyCart => json_error(
            StatusCode::BAD_REQUEST,
            "empty_cart",
            "No hay productos en el carrito",
        ),
        CheckoutError::InvalidQuantity { product_id, quantity } => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_quantity",
            format!("Cantidad inválida ({quantity}) para el producto {product_id}"),
        ),
        CheckoutError::ProductNotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Producto {id} no encontrado"),
        ),
        CheckoutError::InsufficientStock {
            product_name,
            available,
            requested,
            ..
        } => json_error(
            StatusCode::BAD_REQUEST,
            "insufficient_stock",
            format!(
                "Stock insuficiente para {product_name}. Disponible: {available}, Solicitado: {requested}"
            ),
        ),
        CheckoutError::Store(e) => internal(e),
    }
}

pub fn admin_error_to_response(err: AdminError) -> axum::response::Response {
    match err {
        AdminError::Authorization(e) => authz_error_to_response(e),
        AdminError::InvalidValue(v) => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_value",
            format!("Valor de stock inválido: {v}"),
        ),
        AdminError::Store(e) => internal(e),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::Authorization(e) => authz_error_to_response(e),
        CatalogError::Validation(storefront_core::DomainError::MissingFields(_)) => json_error(
            StatusCode::BAD_REQUEST,
            "missing_fields",
            "Faltan campos requeridos",
        ),
        CatalogError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        CatalogError::DuplicateCode(_) => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_code", "El código ya existe")
        }
        CatalogError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "Producto no encontrado")
        }
        CatalogError::Store(e) => internal(e),
    }
}

pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    match err {
        AccountError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        AccountError::DuplicateEmail(_) => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate_email",
            "El email ya está registrado",
        ),
        AccountError::DuplicateUsername(_) => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate_username",
            "El nombre de usuario ya existe",
        ),
        AccountError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Usuario o contraseña incorrectos",
        ),
        AccountError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "Usuario no encontrado")
        }
        AccountError::InvalidRole(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_role", "Rol inválido")
        }
        AccountError::SelfDeletion => json_error(
            StatusCode::BAD_REQUEST,
            "self_deletion",
            "No puedes eliminar tu propia cuenta",
        ),
        AccountError::InvalidResetToken => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_token",
            "El enlace ha expirado o es inválido",
        ),
        AccountError::Authorization(e) => authz_error_to_response(e),
        AccountError::Token(e) => internal(e),
        AccountError::Password(e) => internal(e),
        AccountError::Store(e) => internal(e),
    }
}
