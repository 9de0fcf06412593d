//! Administrative bulk stock reset.
//!
//! Destructive and unfiltered: every product gets the same stock value. Meant
//! for demo/test environments. Not isolated from in-flight checkouts.

use serde::Serialize;

use storefront_auth::{Permission, Principal, require_admin};
use storefront_catalog::CatalogStore;

use crate::AdminError;

/// Stock value applied when the caller does not supply one.
pub const DEFAULT_RESET_STOCK: i64 = 10;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    /// Number of catalog records written.
    pub updated_count: u64,
}

#[derive(Debug, Clone)]
pub struct StockAdministrator<S> {
    store: S,
}

impl<S> StockAdministrator<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip_all, fields(user = %principal.username, value = value))]
    pub async fn reset_stock(&self, principal: &Principal, value: i64) -> Result<ResetSummary, AdminError> {
        require_admin(principal, Permission::StockReset)?;

        if value < 0 {
            return Err(AdminError::InvalidValue(value));
        }

        let updated_count = self.store.set_all_stock(value).await?;
        tracing::info!(updated_count, "stock reset");
        Ok(ResetSummary { updated_count })
    }
}
