use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use storefront_inventory::CheckoutError;

use crate::app::{dto, errors, services::AppServices};
use crate::context::CurrentPrincipal;

/// POST /checkout
pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    payload: Result<Json<dto::CheckoutRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    let items = match body.line_items() {
        Ok(items) => items,
        Err(_) => return errors::invalid_id(),
    };

    match services.checkout.process_checkout(&principal, &items).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "mensaje": "Compra procesada exitosamente",
                "productos_actualizados": summary.updated_count,
            })),
        )
            .into_response(),
        Err(e) => {
            if !matches!(e, CheckoutError::Store(_)) {
                tracing::info!(user = %principal.username, reason = %e, "checkout rejected");
            }
            errors::checkout_error_to_response(e)
        }
    }
}
