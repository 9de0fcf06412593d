//! Catalog domain module.
//!
//! The product record, cart line items and the `CatalogStore` port. Business
//! rules here are deterministic (no IO); stores live in `storefront-infra`.

pub mod line_item;
pub mod product;
pub mod store;

pub use line_item::CartLineItem;
pub use product::{DEFAULT_IMAGE, NewProduct, Product, ProductPatch};
pub use store::{CatalogStore, StockDecrement, StoreError};
