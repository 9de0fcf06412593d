//! Accounts: registration, login, password recovery and role management.
//!
//! This is the account/session collaborator the checkout core consumes: it
//! produces the bearer tokens that become request-scoped principals.

pub mod error;
pub mod mailer;
pub mod service;
pub mod store;
pub mod user;

pub use error::AccountError;
pub use mailer::{MailError, Mailer, OutgoingEmail};
pub use service::{AccountService, AuthSession, ResetSettings};
pub use store::{AccountStore, AccountStoreError};
pub use user::{NewUser, User, UserView};
