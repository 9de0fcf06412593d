//! Stock availability check.

use std::collections::HashMap;

use storefront_catalog::{CartLineItem, CatalogStore, Product};
use storefront_core::ProductId;

use crate::CheckoutError;

/// Read-only decision over current catalog stock.
#[derive(Debug, Clone)]
pub struct StockValidator<S> {
    store: S,
}

impl<S> StockValidator<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Check every line item against current stock, in submission order.
    ///
    /// The first failing item determines the error. Lines repeating a product
    /// are checked against the cumulative quantity requested for it so far.
    pub async fn validate(&self, items: &[CartLineItem]) -> Result<(), CheckoutError> {
        self.snapshot(items).await.map(|_| ())
    }

    /// Same as [`Self::validate`], returning the products read along the way.
    pub(crate) async fn snapshot(
        &self,
        items: &[CartLineItem],
    ) -> Result<HashMap<ProductId, Product>, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut seen: HashMap<ProductId, Product> = HashMap::new();
        let mut requested: HashMap<ProductId, i64> = HashMap::new();

        for item in items {
            if item.quantity <= 0 {
                return Err(CheckoutError::InvalidQuantity {
                    product_id: item.product_id,
                    quantity: item.quantity,
                });
            }

            if !seen.contains_key(&item.product_id) {
                let product = self
                    .store
                    .get(item.product_id)
                    .await?
                    .ok_or(CheckoutError::ProductNotFound(item.product_id))?;
                seen.insert(item.product_id, product);
            }
            let Some(product) = seen.get(&item.product_id) else {
                return Err(CheckoutError::ProductNotFound(item.product_id));
            };

            let total = requested.entry(item.product_id).or_insert(0);
            *total = total.saturating_add(item.quantity);
            if *total > product.stock {
                return Err(CheckoutError::InsufficientStock {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    available: product.stock,
                    requested: *total,
                });
            }
        }

        Ok(seen)
    }
}
