use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use storefront_auth::Permission;
use storefront_inventory::DEFAULT_RESET_STOCK;

use crate::app::{dto, errors, services::AppServices};
use crate::context::CurrentPrincipal;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/buscar", get(search_products))
        .route("/restablecer-stock", post(reset_stock))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// GET /productos?categoria=
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    match services
        .catalog
        .list(&principal, query.categoria.as_deref())
        .await
    {
        Ok(products) => (StatusCode::OK, Json(dto::products_to_json(&products))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// GET /productos/buscar?q=
pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    match services.catalog.search(&principal, &query.q).await {
        Ok(products) => (StatusCode::OK, Json(dto::products_to_json(&products))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = dto::parse_product_id(&id) else {
        return errors::invalid_id();
    };
    match services.catalog.get(&principal, id).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    caller: CurrentPrincipal,
    payload: Result<Json<dto::ProductRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = caller.require_admin(Permission::CatalogWrite) {
        return denied;
    }
    let CurrentPrincipal(principal) = caller;
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    match services.catalog.create(&principal, body.into()).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    caller: CurrentPrincipal,
    Path(id): Path<String>,
    payload: Result<Json<dto::ProductRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = caller.require_admin(Permission::CatalogWrite) {
        return denied;
    }
    let CurrentPrincipal(principal) = caller;
    let Ok(id) = dto::parse_product_id(&id) else {
        return errors::invalid_id();
    };
    let Json(body) = match payload {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    match services.catalog.update(&principal, id, body.into()).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(&product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    caller: CurrentPrincipal,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = caller.require_admin(Permission::CatalogWrite) {
        return denied;
    }
    let CurrentPrincipal(principal) = caller;
    let Ok(id) = dto::parse_product_id(&id) else {
        return errors::invalid_id();
    };
    match services.catalog.delete(&principal, id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "mensaje": "Producto eliminado exitosamente" })),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// POST /productos/restablecer-stock
///
/// The body is optional; without one every product is reset to
/// [`DEFAULT_RESET_STOCK`]. A non-empty body must be JSON.
pub async fn reset_stock(
    Extension(services): Extension<Arc<AppServices>>,
    caller: CurrentPrincipal,
    headers: HeaderMap,
    raw: Bytes,
) -> axum::response::Response {
    if let Err(denied) = caller.require_admin(Permission::StockReset) {
        return denied;
    }
    let CurrentPrincipal(principal) = caller;
    let body = match reset_request(&headers, &raw) {
        Ok(b) => b,
        Err(rejected) => return rejected,
    };
    let value = body.stock_default.unwrap_or(DEFAULT_RESET_STOCK);

    match services.stock_admin.reset_stock(&principal, value).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "mensaje": format!("Stock restablecido a {value} unidades"),
                "productos_actualizados": summary.updated_count,
            })),
        )
            .into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

fn reset_request(
    headers: &HeaderMap,
    raw: &Bytes,
) -> Result<dto::ResetStockRequest, axum::response::Response> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(dto::ResetStockRequest::default());
    }
    if !is_json_content_type(headers) {
        return Err(errors::json_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "invalid_body",
            "Se esperaba Content-Type: application/json",
        ));
    }
    Json::<dto::ResetStockRequest>::from_bytes(raw)
        .map(|Json(body)| body)
        .map_err(errors::json_rejection)
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
