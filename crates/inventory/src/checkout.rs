//! Checkout: validate the whole cart, then decrement stock line by line.
//!
//! Each decrement is a conditional atomic update in the store (only applied
//! if stock stays >= 0). A checkout that passed validation can still lose a
//! race against a concurrent one; in that case the decrements already applied
//! by this call are given back and the call fails as if validation had.

use serde::Serialize;

use storefront_auth::{Permission, Principal, authorize};
use storefront_catalog::{CartLineItem, CatalogStore, StockDecrement};

use crate::{CheckoutError, StockValidator};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    /// Number of line items processed.
    pub updated_count: usize,
}

#[derive(Debug, Clone)]
pub struct CheckoutProcessor<S> {
    store: S,
    validator: StockValidator<S>,
}

impl<S> CheckoutProcessor<S>
where
    S: CatalogStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            validator: StockValidator::new(store.clone()),
            store,
        }
    }

    #[tracing::instrument(skip_all, fields(user = %principal.username, lines = items.len()))]
    pub async fn process_checkout(
        &self,
        principal: &Principal,
        items: &[CartLineItem],
    ) -> Result<CheckoutSummary, CheckoutError> {
        authorize(principal, Permission::Checkout)?;

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let snapshot = self.validator.snapshot(items).await?;

        let mut applied: Vec<&CartLineItem> = Vec::with_capacity(items.len());
        for item in items {
            let outcome = self.store.decrement_stock(item.product_id, item.quantity).await;
            let err = match outcome {
                Ok(StockDecrement::Applied { remaining }) => {
                    tracing::debug!(product_id = %item.product_id, remaining, "stock decremented");
                    applied.push(item);
                    continue;
                }
                Ok(StockDecrement::Insufficient { available }) => CheckoutError::InsufficientStock {
                    product_id: item.product_id,
                    product_name: snapshot
                        .get(&item.product_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| item.product_id.to_string()),
                    available,
                    requested: item.quantity,
                },
                Ok(StockDecrement::Missing) => CheckoutError::ProductNotFound(item.product_id),
                Err(e) => CheckoutError::Store(e),
            };

            tracing::warn!(product_id = %item.product_id, error = %err, "checkout lost a race after validation");
            self.compensate(&applied).await;
            return Err(err);
        }

        tracing::info!(updated = items.len(), "checkout processed");
        Ok(CheckoutSummary {
            updated_count: items.len(),
        })
    }

    async fn compensate(&self, applied: &[&CartLineItem]) {
        for item in applied.iter().rev() {
            if let Err(e) = self.store.restore_stock(item.product_id, item.quantity).await {
                tracing::error!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %e,
                    "failed to restore stock after aborted checkout"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, catalog_with, customer, stock_of};
    use storefront_core::ProductId;

    #[tokio::test]
    async fn successful_checkout_decrements_each_line() {
        let (store, ids) = catalog_with(&[("A", 5), ("B", 4)]).await;
        let processor = CheckoutProcessor::new(store.clone());
        let items = [CartLineItem::new(ids[0], 2), CartLineItem::new(ids[1], 4)];

        let summary = processor.process_checkout(&customer(), &items).await.unwrap();

        assert_eq!(summary.updated_count, 2);
        assert_eq!(stock_of(&store, ids[0]).await, 3);
        assert_eq!(stock_of(&store, ids[1]).await, 0);
    }

    #[tokio::test]
    async fn one_unavailable_line_rejects_the_whole_cart() {
        let (store, ids) = catalog_with(&[("A", 5), ("B", 0)]).await;
        let processor = CheckoutProcessor::new(store.clone());
        let items = [CartLineItem::new(ids[0], 3), CartLineItem::new(ids[1], 1)];

        let err = processor.process_checkout(&customer(), &items).await.unwrap_err();

        match err {
            CheckoutError::InsufficientStock { product_id, product_name, available, requested } => {
                assert_eq!(product_id, ids[1]);
                assert_eq!(product_name, "B");
                assert_eq!((available, requested), (0, 1));
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(stock_of(&store, ids[0]).await, 5);
        assert_eq!(stock_of(&store, ids[1]).await, 0);
    }

    #[tokio::test]
    async fn draining_stock_blocks_the_next_checkout() {
        let (store, ids) = catalog_with(&[("A", 5)]).await;
        let processor = CheckoutProcessor::new(store.clone());

        processor
            .process_checkout(&customer(), &[CartLineItem::new(ids[0], 5)])
            .await
            .unwrap();
        assert_eq!(stock_of(&store, ids[0]).await, 0);

        let err = processor
            .process_checkout(&customer(), &[CartLineItem::new(ids[0], 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock { .. }));
    }

    #[tokio::test]
    async fn empty_cart_fails_for_any_role() {
        let (store, _) = catalog_with(&[("A", 5)]).await;
        let processor = CheckoutProcessor::new(store);
        assert_eq!(
            processor.process_checkout(&admin(), &[]).await,
            Err(CheckoutError::EmptyCart)
        );
    }

    #[tokio::test]
    async fn missing_product_leaves_stock_alone() {
        let (store, ids) = catalog_with(&[("A", 5)]).await;
        let processor = CheckoutProcessor::new(store.clone());
        let missing = ProductId::new();
        let items = [CartLineItem::new(ids[0], 1), CartLineItem::new(missing, 1)];
        assert_eq!(
            processor.process_checkout(&customer(), &items).await,
            Err(CheckoutError::ProductNotFound(missing))
        );
        assert_eq!(stock_of(&store, ids[0]).await, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checkouts_never_oversell() {
        let (store, ids) = catalog_with(&[("A", 10)]).await;
        let processor = std::sync::Arc::new(CheckoutProcessor::new(store.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let processor = processor.clone();
            let id = ids[0];
            handles.push(tokio::spawn(async move {
                processor
                    .process_checkout(&customer(), &[CartLineItem::new(id, 3)])
                    .await
                    .is_ok()
            }));
        }

        let mut succeeded = 0;
        for h in handles {
            if h.await.unwrap() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(stock_of(&store, ids[0]).await, 1);
    }

    mod lost_race {
        use super::*;
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        use async_trait::async_trait;
        use storefront_catalog::{Product, StoreError};
        use storefront_infra::InMemoryCatalogStore;

        /// Delegates to an in-memory catalog, except that decrement number
        /// `fail_on` (0-based) reports `outcome` without touching stock, as if
        /// another checkout got there first.
        struct RacingStore {
            inner: Arc<InMemoryCatalogStore>,
            fail_on: usize,
            outcome: StockDecrement,
            decrements: AtomicUsize,
            restores: AtomicUsize,
        }

        impl RacingStore {
            fn new(inner: Arc<InMemoryCatalogStore>, fail_on: usize, outcome: StockDecrement) -> Arc<Self> {
                Arc::new(Self {
                    inner,
                    fail_on,
                    outcome,
                    decrements: AtomicUsize::new(0),
                    restores: AtomicUsize::new(0),
                })
            }
        }

        #[async_trait]
        impl CatalogStore for RacingStore {
            async fn insert(&self, product: Product) -> Result<Product, StoreError> {
                self.inner.insert(product).await
            }

            async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
                self.inner.get(id).await
            }

            async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
                self.inner.list(category).await
            }

            async fn search(&self, term: &str) -> Result<Vec<Product>, StoreError> {
                self.inner.search(term).await
            }

            async fn find_by_code(&self, code: &str) -> Result<Option<Product>, StoreError> {
                self.inner.find_by_code(code).await
            }

            async fn replace(&self, product: Product) -> Result<bool, StoreError> {
                self.inner.replace(product).await
            }

            async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
                self.inner.delete(id).await
            }

            async fn decrement_stock(&self, id: ProductId, quantity: i64) -> Result<StockDecrement, StoreError> {
                if self.decrements.fetch_add(1, Ordering::SeqCst) == self.fail_on {
                    return Ok(self.outcome);
                }
                self.inner.decrement_stock(id, quantity).await
            }

            async fn restore_stock(&self, id: ProductId, quantity: i64) -> Result<(), StoreError> {
                self.restores.fetch_add(1, Ordering::SeqCst);
                self.inner.restore_stock(id, quantity).await
            }

            async fn set_all_stock(&self, value: i64) -> Result<u64, StoreError> {
                self.inner.set_all_stock(value).await
            }
        }

        #[tokio::test]
        async fn insufficient_decrement_restores_earlier_lines() {
            let (inner, ids) = catalog_with(&[("A", 5), ("B", 6), ("C", 4)]).await;
            let store = RacingStore::new(inner.clone(), 2, StockDecrement::Insufficient { available: 1 });
            let processor = CheckoutProcessor::new(store.clone());
            let items = [
                CartLineItem::new(ids[0], 2),
                CartLineItem::new(ids[1], 3),
                CartLineItem::new(ids[2], 4),
            ];

            let err = processor.process_checkout(&customer(), &items).await.unwrap_err();

            assert_eq!(
                err,
                CheckoutError::InsufficientStock {
                    product_id: ids[2],
                    product_name: "C".to_string(),
                    available: 1,
                    requested: 4,
                }
            );
            assert_eq!(store.restores.load(Ordering::SeqCst), 2);
            assert_eq!(stock_of(&inner, ids[0]).await, 5);
            assert_eq!(stock_of(&inner, ids[1]).await, 6);
            assert_eq!(stock_of(&inner, ids[2]).await, 4);
        }

        #[tokio::test]
        async fn vanished_product_restores_earlier_lines() {
            let (inner, ids) = catalog_with(&[("A", 5), ("B", 6)]).await;
            let store = RacingStore::new(inner.clone(), 1, StockDecrement::Missing);
            let processor = CheckoutProcessor::new(store.clone());
            let items = [CartLineItem::new(ids[0], 5), CartLineItem::new(ids[1], 1)];

            assert_eq!(
                processor.process_checkout(&customer(), &items).await,
                Err(CheckoutError::ProductNotFound(ids[1]))
            );
            assert_eq!(store.restores.load(Ordering::SeqCst), 1);
            assert_eq!(stock_of(&inner, ids[0]).await, 5);
            assert_eq!(stock_of(&inner, ids[1]).await, 6);
        }

        #[tokio::test]
        async fn first_line_losing_the_race_restores_nothing() {
            let (inner, ids) = catalog_with(&[("A", 5)]).await;
            let store = RacingStore::new(inner.clone(), 0, StockDecrement::Insufficient { available: 0 });
            let processor = CheckoutProcessor::new(store.clone());

            let err = processor
                .process_checkout(&customer(), &[CartLineItem::new(ids[0], 3)])
                .await
                .unwrap_err();

            assert!(matches!(err, CheckoutError::InsufficientStock { available: 0, .. }));
            assert_eq!(store.restores.load(Ordering::SeqCst), 0);
            assert_eq!(stock_of(&inner, ids[0]).await, 5);
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn run<F: std::future::Future>(f: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(f)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            /// Property: a fully available cart removes exactly what was requested.
            #[test]
            fn in_stock_cart_removes_exactly_requested(
                lines in prop::collection::vec((0usize..3, 1i64..5), 1..6),
            ) {
                run(async {
                    let (store, ids) = catalog_with(&[("A", 100), ("B", 100), ("C", 100)]).await;
                    let processor = CheckoutProcessor::new(store.clone());
                    let items: Vec<_> = lines.iter().map(|(i, q)| CartLineItem::new(ids[*i], *q)).collect();

                    let summary = processor.process_checkout(&customer(), &items).await.unwrap();
                    prop_assert_eq!(summary.updated_count, items.len());

                    let mut removed = 0;
                    for (idx, id) in ids.iter().enumerate() {
                        let expected: i64 = lines.iter().filter(|(i, _)| *i == idx).map(|(_, q)| q).sum();
                        let stock = stock_of(&store, *id).await;
                        prop_assert_eq!(stock, 100 - expected);
                        removed += 100 - stock;
                    }
                    prop_assert_eq!(removed, lines.iter().map(|(_, q)| q).sum::<i64>());
                    Ok(())
                })?;
            }

            /// Property: if any line exceeds stock, no product's stock changes.
            #[test]
            fn oversized_line_changes_nothing(
                lines in prop::collection::vec((0usize..2, 1i64..4), 0..5),
                excess in 1i64..10,
            ) {
                run(async {
                    let (store, ids) = catalog_with(&[("A", 20), ("B", 20), ("C", 2)]).await;
                    let processor = CheckoutProcessor::new(store.clone());
                    let mut items: Vec<_> = lines.iter().map(|(i, q)| CartLineItem::new(ids[*i], *q)).collect();
                    items.push(CartLineItem::new(ids[2], 2 + excess));

                    let result = processor.process_checkout(&customer(), &items).await;
                    let is_insufficient = matches!(result, Err(CheckoutError::InsufficientStock { .. }));
                    prop_assert!(is_insufficient);
                    prop_assert_eq!(stock_of(&store, ids[0]).await, 20);
                    prop_assert_eq!(stock_of(&store, ids[1]).await, 20);
                    prop_assert_eq!(stock_of(&store, ids[2]).await, 2);
                    Ok(())
                })?;
            }
        }
    }
}
