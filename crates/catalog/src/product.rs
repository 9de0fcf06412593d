use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ProductId};

/// Image reference used when a product is created without one.
pub const DEFAULT_IMAGE: &str = "./img/default.jpg";

/// A catalog product.
///
/// # Invariants
/// - `price >= 0`
/// - `stock >= 0`
/// - `code` is non-blank (uniqueness is enforced by the store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub code: String,
    pub category: String,
    pub image: String,
    pub description: Option<String>,
    pub stock: i64,
}

impl Product {
    /// Re-check every invariant. Stores call this on records they load.
    pub fn validate(&self) -> DomainResult<()> {
        non_blank("name", &self.name)?;
        non_blank("code", &self.code)?;
        non_blank("category", &self.category)?;
        validate_price(self.price)?;
        validate_stock(self.stock)
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }

    /// Case-insensitive substring match over `code` and `name`.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.code.to_lowercase().contains(&term) || self.name.to_lowercase().contains(&term)
    }
}

/// Input for product creation. Every field is optional so that missing
/// required fields can be reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i64>,
}

impl NewProduct {
    pub fn into_product(self, id: ProductId) -> DomainResult<Product> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("nombre");
        }
        if self.price.is_none() {
            missing.push("precio");
        }
        if self.code.is_none() {
            missing.push("codigo");
        }
        if self.category.is_none() {
            missing.push("categoria");
        }

        let (Some(name), Some(price), Some(code), Some(category)) =
            (self.name, self.price, self.code, self.category)
        else {
            return Err(DomainError::MissingFields(missing));
        };

        let product = Product {
            id,
            name,
            price,
            code,
            category,
            image: self.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            description: self.description,
            stock: self.stock.unwrap_or(0),
        };
        product.validate()?;
        Ok(product)
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i64>,
}

impl ProductPatch {
    /// The new code, if this patch changes it relative to `current`.
    pub fn changed_code<'a>(&'a self, current: &Product) -> Option<&'a str> {
        self.code.as_deref().filter(|code| *code != current.code)
    }

    pub fn apply(&self, current: &Product) -> DomainResult<Product> {
        let mut next = current.clone();
        if let Some(v) = &self.name {
            next.name = v.clone();
        }
        if let Some(v) = self.price {
            next.price = v;
        }
        if let Some(v) = &self.code {
            next.code = v.clone();
        }
        if let Some(v) = &self.category {
            next.category = v.clone();
        }
        if let Some(v) = &self.image {
            next.image = v.clone();
        }
        if let Some(v) = &self.description {
            next.description = Some(v.clone());
        }
        if let Some(v) = self.stock {
            next.stock = v;
        }
        next.validate()?;
        Ok(next)
    }
}

fn non_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> DomainResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DomainError::validation("price cannot be negative"));
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> DomainResult<()> {
    if stock < 0 {
        return Err(DomainError::invariant("stock cannot go negative"));
    }
    Ok(())
}
