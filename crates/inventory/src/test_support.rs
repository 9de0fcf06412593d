use std::sync::Arc;

use rust_decimal::Decimal;

use storefront_auth::{Principal, Role};
use storefront_catalog::{CatalogStore, NewProduct};
use storefront_core::{ProductId, UserId};
use storefront_infra::InMemoryCatalogStore;

/// Seed an in-memory catalog with `(name, stock)` products; code is `C-<name>`.
pub async fn catalog_with(products: &[(&str, i64)]) -> (Arc<InMemoryCatalogStore>, Vec<ProductId>) {
    let store = Arc::new(InMemoryCatalogStore::new());
    let mut ids = Vec::with_capacity(products.len());
    for (name, stock) in products {
        let product = NewProduct {
            name: Some(name.to_string()),
            price: Some(Decimal::new(999, 2)),
            code: Some(format!("C-{name}")),
            category: Some("General".to_string()),
            stock: Some(*stock),
            ..NewProduct::default()
        }
        .into_product(ProductId::new())
        .unwrap();
        ids.push(store.insert(product).await.unwrap().id);
    }
    (store, ids)
}

pub async fn stock_of(store: &Arc<InMemoryCatalogStore>, id: ProductId) -> i64 {
    store.get(id).await.unwrap().unwrap().stock
}

pub fn customer() -> Principal {
    Principal::new(UserId::new(), "cliente1", Role::Customer)
}

pub fn admin() -> Principal {
    Principal::new(UserId::new(), "root", Role::Admin)
}
