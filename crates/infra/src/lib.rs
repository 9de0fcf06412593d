//! Infrastructure layer: stores, configuration, outbound email.

pub mod account_store;
pub mod catalog_store;
pub mod config;
pub mod db;
pub mod mailer;

pub use account_store::{InMemoryAccountStore, PostgresAccountStore};
pub use catalog_store::{InMemoryCatalogStore, PostgresCatalogStore};
pub use config::{AppConfig, ConfigError};
pub use db::DbError;
pub use mailer::{InMemoryMailer, LogMailer};
