//! Product administration (admin) and lookup (any authenticated caller).

use storefront_auth::{Permission, Principal, authorize, require_admin};
use storefront_catalog::{CatalogStore, NewProduct, Product, ProductPatch};
use storefront_core::ProductId;

use crate::CatalogError;

/// Category value that means "no filter".
const ALL_CATEGORIES: &str = "todos";

#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, principal: &Principal, input: NewProduct) -> Result<Product, CatalogError> {
        require_admin(principal, Permission::CatalogWrite)?;

        let product = input.into_product(ProductId::new())?;
        if self.store.find_by_code(&product.code).await?.is_some() {
            return Err(CatalogError::DuplicateCode(product.code));
        }

        let product = self.store.insert(product).await?;
        tracing::info!(product_id = %product.id, code = %product.code, "product created");
        Ok(product)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        require_admin(principal, Permission::CatalogWrite)?;

        let current = self.store.get(id).await?.ok_or(CatalogError::NotFound(id))?;

        if let Some(code) = patch.changed_code(&current) {
            if let Some(other) = self.store.find_by_code(code).await? {
                if other.id != id {
                    return Err(CatalogError::DuplicateCode(code.to_string()));
                }
            }
        }

        let next = patch.apply(&current)?;
        if !self.store.replace(next.clone()).await? {
            return Err(CatalogError::NotFound(id));
        }
        Ok(next)
    }

    pub async fn get(&self, principal: &Principal, id: ProductId) -> Result<Product, CatalogError> {
        authorize(principal, Permission::CatalogRead)?;
        self.store.get(id).await?.ok_or(CatalogError::NotFound(id))
    }

    /// `None`, blank or `"todos"` lists everything.
    pub async fn list(&self, principal: &Principal, category: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        authorize(principal, Permission::CatalogRead)?;
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES));
        Ok(self.store.list(category).await?)
    }

    /// Blank terms match nothing.
    pub async fn search(&self, principal: &Principal, term: &str) -> Result<Vec<Product>, CatalogError> {
        authorize(principal, Permission::CatalogRead)?;
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.search(term).await?)
    }

    pub async fn delete(&self, principal: &Principal, id: ProductId) -> Result<(), CatalogError> {
        require_admin(principal, Permission::CatalogWrite)?;
        if !self.store.delete(id).await? {
            return Err(CatalogError::NotFound(id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
