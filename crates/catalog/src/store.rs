//! Catalog persistence port.
//!
//! The only paths that mutate stock outside product administration are
//! [`CatalogStore::decrement_stock`] (checkout) and
//! [`CatalogStore::set_all_stock`] (bulk reset).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_core::ProductId;

use crate::Product;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another product already uses this code.
    #[error("product code '{0}' already exists")]
    DuplicateCode(String),

    /// A persisted record could not be coerced into a valid `Product`.
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),

    /// The backing store failed (connection, query, lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock was decremented; `remaining` is the new value.
    Applied { remaining: i64 },
    /// Current stock is lower than the requested quantity; nothing changed.
    Insufficient { available: i64 },
    /// No product with that id.
    Missing,
}

/// Persistent collection of product records, shared by all callers.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a new product. Fails with `DuplicateCode` if the code is taken.
    async fn insert(&self, product: Product) -> Result<Product, StoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All products, optionally restricted to a category (case-insensitive exact match).
    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError>;

    /// Case-insensitive substring search over code and name.
    async fn search(&self, term: &str) -> Result<Vec<Product>, StoreError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, StoreError>;

    /// Overwrite an existing record. Returns `false` if it does not exist.
    /// Fails with `DuplicateCode` if another record already holds the code.
    async fn replace(&self, product: Product) -> Result<bool, StoreError>;

    /// Returns `false` if no record matched.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Atomically decrement stock by `quantity` only if the result stays >= 0.
    async fn decrement_stock(&self, id: ProductId, quantity: i64) -> Result<StockDecrement, StoreError>;

    /// Give back stock taken by a decrement that has to be undone.
    async fn restore_stock(&self, id: ProductId, quantity: i64) -> Result<(), StoreError>;

    /// Set every product's stock to `value`; returns the number of records.
    async fn set_all_stock(&self, value: i64) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        (**self).insert(product).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        (**self).list(category).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>, StoreError> {
        (**self).search(term).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, StoreError> {
        (**self).find_by_code(code).await
    }

    async fn replace(&self, product: Product) -> Result<bool, StoreError> {
        (**self).replace(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn decrement_stock(&self, id: ProductId, quantity: i64) -> Result<StockDecrement, StoreError> {
        (**self).decrement_stock(id, quantity).await
    }

    async fn restore_stock(&self, id: ProductId, quantity: i64) -> Result<(), StoreError> {
        (**self).restore_stock(id, quantity).await
    }

    async fn set_all_stock(&self, value: i64) -> Result<u64, StoreError> {
        (**self).set_all_stock(value).await
    }
}
