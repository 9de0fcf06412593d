use serde::{Deserialize, Serialize};

/// Capability checked by the guards before a core operation runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read products (list, search, lookup).
    CatalogRead,
    /// Submit a cart for checkout.
    Checkout,
    /// Create, update or delete products.
    CatalogWrite,
    /// Bulk-overwrite stock across the catalog.
    StockReset,
    /// List users, change roles, delete accounts.
    UsersManage,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CatalogRead => "catalog.read",
            Permission::Checkout => "checkout",
            Permission::CatalogWrite => "catalog.write",
            Permission::StockReset => "catalog.stock.reset",
            Permission::UsersManage => "users.manage",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
