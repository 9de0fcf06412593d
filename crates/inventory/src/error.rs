use thiserror::Error;

use storefront_auth::AuthzError;
use storefront_catalog::StoreError;
use storefront_core::{DomainError, ProductId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error(transparent)]
    Authorization(#[from] AuthzError),

    #[error("no products in the cart")]
    EmptyCart,

    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },

    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    #[error("insufficient stock for {product_name}. available: {available}, requested: {requested}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: i64,
        requested: i64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error(transparent)]
    Authorization(#[from] AuthzError),

    #[error("invalid stock value {0}: must be >= 0")]
    InvalidValue(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    Authorization(#[from] AuthzError),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("product code '{0}' already exists")]
    DuplicateCode(String),

    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateCode(code) => CatalogError::DuplicateCode(code),
            other => CatalogError::Store(other),
        }
    }
}
