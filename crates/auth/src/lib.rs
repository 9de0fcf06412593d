//! `storefront-auth`: authentication and authorization boundary.
//!
//! Decoupled from HTTP and storage: request-scoped principals, role policy,
//! guard functions, token signing/validation and password hashing.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod reset;
pub mod roles;

pub use authorize::{AuthzError, authorize, require_admin, require_authenticated};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
pub use password::{Argon2PasswordHasher, PasswordError, PasswordHasher};
pub use permissions::Permission;
pub use principal::Principal;
pub use reset::{PASSWORD_RESET_PURPOSE, ResetTokenSigner};
pub use roles::Role;
