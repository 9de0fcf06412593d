use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use storefront_catalog::{CatalogStore, Product, StockDecrement, StoreError};
use storefront_core::ProductId;

/// In-memory catalog for tests/dev.
///
/// Keyed by UUIDv7 ids, so iteration follows creation order. Stock updates
/// take the write lock for the whole check-and-set, which makes
/// `decrement_stock` atomic.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ProductId, Product>>, StoreError> {
        self.products
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ProductId, Product>>, StoreError> {
        self.products
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn filtered(&self, keep: impl Fn(&Product) -> bool) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.values().filter(|p| keep(p)).cloned().collect())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let mut products = self.write()?;
        if products.values().any(|p| p.code == product.code) {
            return Err(StoreError::DuplicateCode(product.code));
        }
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        match category {
            Some(c) => self.filtered(|p| p.in_category(c)),
            None => self.filtered(|_| true),
        }
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>, StoreError> {
        self.filtered(|p| p.matches_term(term))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.values().find(|p| p.code == code).cloned())
    }

    async fn replace(&self, product: Product) -> Result<bool, StoreError> {
        let mut products = self.write()?;
        if !products.contains_key(&product.id) {
            return Ok(false);
        }
        if products
            .values()
            .any(|p| p.id != product.id && p.code == product.code)
        {
            return Err(StoreError::DuplicateCode(product.code));
        }
        products.insert(product.id, product);
        Ok(true)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }

    async fn decrement_stock(&self, id: ProductId, quantity: i64) -> Result<StockDecrement, StoreError> {
        let mut products = self.write()?;
        let Some(product) = products.get_mut(&id) else {
            return Ok(StockDecrement::Missing);
        };
        if product.stock < quantity {
            return Ok(StockDecrement::Insufficient {
                available: product.stock,
            });
        }
        product.stock -= quantity;
        Ok(StockDecrement::Applied {
            remaining: product.stock,
        })
    }

    async fn restore_stock(&self, id: ProductId, quantity: i64) -> Result<(), StoreError> {
        if let Some(product) = self.write()?.get_mut(&id) {
            product.stock = product.stock.saturating_add(quantity);
        }
        Ok(())
    }

    async fn set_all_stock(&self, value: i64) -> Result<u64, StoreError> {
        let mut products = self.write()?;
        for product in products.values_mut() {
            product.stock = value;
        }
        Ok(products.len() as u64)
    }
}
