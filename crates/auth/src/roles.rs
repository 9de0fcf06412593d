use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Account role.
///
/// Wire names follow the storefront's client: `"admin"` and `"cliente"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "cliente")]
    Customer,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "cliente",
            Role::Admin => "admin",
        }
    }

    /// Permissions granted by this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Customer => &[Permission::CatalogRead, Permission::Checkout],
            Role::Admin => &[
                Permission::CatalogRead,
                Permission::Checkout,
                Permission::CatalogWrite,
                Permission::StockReset,
                Permission::UsersManage,
            ],
        }
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cliente" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
