//! Postgres-backed catalog store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation on `code`) | `23505` | `DuplicateCode` |
//! | Database (check violation, e.g. negative stock) | `23514` | `InvalidRecord` |
//! | Anything else | – | `Unavailable` |
//!
//! Stock decrements are a single conditional `UPDATE … WHERE stock >= $n`, so
//! concurrent checkouts cannot drive stock below zero.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use storefront_catalog::{CatalogStore, Product, StockDecrement, StoreError};
use storefront_core::ProductId;

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
    code: String,
    category: String,
    image: String,
    description: Option<String>,
    stock: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            code: row.try_get("code")?,
            category: row.try_get("category")?,
            image: row.try_get("image")?,
            description: row.try_get("description")?,
            stock: row.try_get("stock")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let product = Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            price: row.price,
            code: row.code,
            category: row.category,
            image: row.image,
            description: row.description,
            stock: row.stock,
        };
        product
            .validate()
            .map_err(|e| StoreError::InvalidRecord(format!("product {}: {e}", product.id)))?;
        Ok(product)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error, code: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                return StoreError::DuplicateCode(code.unwrap_or_default().to_string());
            }
            Some("23514") => {
                return StoreError::InvalidRecord(format!("{operation}: {}", db_err.message()));
            }
            _ => {}
        }
    }
    tracing::error!(operation, error = %err, "catalog store query failed");
    StoreError::Unavailable(format!("{operation}: {err}"))
}

fn rows_into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, StoreError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Escape LIKE metacharacters so the term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const SELECT_PRODUCT: &str =
    "SELECT id, name, price, code, category, image, description, stock FROM products";

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip_all, fields(code = %product.code))]
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, code, category, image, description, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.code)
        .bind(&product.category)
        .bind(&product.image)
        .bind(&product.description)
        .bind(product.stock)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e, Some(&product.code)))?;
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e, None))?;
        row.map(Product::try_from).transpose()
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "{SELECT_PRODUCT} WHERE ($1::text IS NULL OR lower(category) = lower($1)) ORDER BY created_at, id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e, None))?;
        rows_into_products(rows)
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>, StoreError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "{SELECT_PRODUCT} WHERE code ILIKE $1 OR name ILIKE $1 ORDER BY created_at, id"
        ))
        .bind(like_pattern(term))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_products", e, None))?;
        rows_into_products(rows)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE code = $1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product_by_code", e, None))?;
        row.map(Product::try_from).transpose()
    }

    async fn replace(&self, product: Product) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, price = $3, code = $4, category = $5,
                image = $6, description = $7, stock = $8
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.code)
        .bind(&product.category)
        .bind(&product.image)
        .bind(&product.description)
        .bind(product.stock)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace_product", e, Some(&product.code)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e, None))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn decrement_stock(&self, id: ProductId, quantity: i64) -> Result<StockDecrement, StoreError> {
        let remaining: Option<i64> = sqlx::query_scalar(
            "UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2 RETURNING stock",
        )
        .bind(id.as_uuid())
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e, None))?;

        if let Some(remaining) = remaining {
            return Ok(StockDecrement::Applied { remaining });
        }

        let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("read_stock", e, None))?;

        Ok(match available {
            Some(available) => StockDecrement::Insufficient { available },
            None => StockDecrement::Missing,
        })
    }

    async fn restore_stock(&self, id: ProductId, quantity: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(quantity)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("restore_stock", e, None))?;
        Ok(())
    }

    async fn set_all_stock(&self, value: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE products SET stock = $1")
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_all_stock", e, None))?;
        Ok(result.rows_affected())
    }
}
