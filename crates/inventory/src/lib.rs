//! Inventory consistency and checkout.
//!
//! - `validator`: read-only stock availability check for a cart
//! - `checkout`: validate-all, then decrement-all
//! - `stock_admin`: administrative bulk stock reset
//! - `catalog`: product administration and lookup
//!
//! Every operation takes the request-scoped [`storefront_auth::Principal`] and
//! runs its guard before touching the store.

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod stock_admin;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use catalog::CatalogService;
pub use checkout::{CheckoutProcessor, CheckoutSummary};
pub use error::{AdminError, CatalogError, CheckoutError};
pub use stock_admin::{DEFAULT_RESET_STOCK, ResetSummary, StockAdministrator};
pub use validator::StockValidator;
