//! `storefront-core`: shared domain building blocks.
//!
//! Identifiers and the domain error model used by every other crate. No IO.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ProductId, UserId};
