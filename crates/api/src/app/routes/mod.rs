use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod checkout;
pub mod products;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/mi-perfil", get(system::profile))
        .route("/checkout", post(checkout::checkout))
        .nest("/productos", products::router())
        .nest("/usuarios", users::router())
}
