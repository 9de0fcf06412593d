//! Wire DTOs. Field names follow the storefront's JSON contract.

use rust_decimal::Decimal;
use serde::Deserialize;

use storefront_accounts::{AuthSession, NewUser, UserView};
use storefront_catalog::{CartLineItem, NewProduct, Product, ProductPatch};
use storefront_core::{DomainError, ProductId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub usuario: String,
    pub email: String,
    pub contrasena: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(body: RegisterRequest) -> Self {
        NewUser {
            username: body.usuario.trim().to_string(),
            email: body.email.trim().to_string(),
            password: body.contrasena,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub usuario: String,
    pub contrasena: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPasswordRequest {
    pub token: String,
    pub nueva_contrasena: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutLineRequest {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub cantidad: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub productos: Vec<CheckoutLineRequest>,
}

impl CheckoutRequest {
    pub fn line_items(&self) -> Result<Vec<CartLineItem>, DomainError> {
        self.productos
            .iter()
            .map(|line| Ok(CartLineItem::new(line.id.parse()?, line.cantidad)))
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetStockRequest {
    pub stock_default: Option<i64>,
}

/// Create and update share one shape; every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub nombre: Option<String>,
    pub precio: Option<Decimal>,
    pub codigo: Option<String>,
    pub categoria: Option<String>,
    pub imagen: Option<String>,
    pub descripcion: Option<String>,
    pub stock: Option<i64>,
}

impl From<ProductRequest> for NewProduct {
    fn from(body: ProductRequest) -> Self {
        NewProduct {
            name: body.nombre,
            price: body.precio,
            code: body.codigo,
            category: body.categoria,
            image: body.imagen,
            description: body.descripcion,
            stock: body.stock,
        }
    }
}

impl From<ProductRequest> for ProductPatch {
    fn from(body: ProductRequest) -> Self {
        ProductPatch {
            name: body.nombre,
            price: body.precio,
            code: body.codigo,
            category: body.categoria,
            image: body.imagen,
            description: body.descripcion,
            stock: body.stock,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub categoria: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

pub fn parse_product_id(raw: &str) -> Result<ProductId, DomainError> {
    raw.parse()
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: &Product) -> serde_json::Value {
    serde_json::json!({
        "_id": p.id.to_string(),
        "nombre": p.name,
        "precio": p.price,
        "codigo": p.code,
        "categoria": p.category,
        "imagen": p.image,
        "descripcion": p.description,
        "stock": p.stock,
    })
}

pub fn products_to_json(products: &[Product]) -> serde_json::Value {
    serde_json::Value::Array(products.iter().map(product_to_json).collect())
}

pub fn session_to_json(session: &AuthSession) -> serde_json::Value {
    serde_json::json!({
        "token": session.token,
        "usuario": session.principal.username,
        "role": session.principal.role.as_str(),
    })
}

pub fn user_to_json(user: &UserView) -> serde_json::Value {
    serde_json::json!({
        "_id": user.id.to_string(),
        "usuario": user.username,
        "email": user.email,
        "role": user.role.as_str(),
    })
}
