//! Account use cases.

use std::sync::Arc;

use chrono::{Duration, Utc};

use storefront_auth::{
    Hs256JwtValidator, PasswordHasher, Permission, Principal, ResetTokenSigner, Role,
    require_admin,
};
use storefront_core::{DomainError, UserId};

use crate::{AccountError, AccountStore, Mailer, NewUser, OutgoingEmail, User, UserView};

/// A freshly issued access token and the principal it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub principal: Principal,
}

/// Password recovery settings.
#[derive(Debug, Clone)]
pub struct ResetSettings {
    /// Base URL the emailed reset link points at.
    pub public_base_url: String,
    pub max_age: Duration,
}

pub struct AccountService<S> {
    store: S,
    hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    tokens: Hs256JwtValidator,
    reset_tokens: ResetTokenSigner,
    public_base_url: String,
}

impl<S> AccountService<S>
where
    S: AccountStore,
{
    pub fn new(
        store: S,
        hasher: Arc<dyn PasswordHasher>,
        mailer: Arc<dyn Mailer>,
        tokens: Hs256JwtValidator,
        secret: &[u8],
        reset: ResetSettings,
    ) -> Self {
        Self {
            store,
            hasher,
            mailer,
            tokens,
            reset_tokens: ResetTokenSigner::new(secret, reset.max_age),
            public_base_url: reset.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn tokens(&self) -> &Hs256JwtValidator {
        &self.tokens
    }

    /// Create a customer account and sign it in.
    #[tracing::instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: NewUser) -> Result<AuthSession, AccountError> {
        input.validate()?;

        if self.store.find_by_email(&input.email).await?.is_some() {
            return Err(AccountError::DuplicateEmail(input.email));
        }
        if self.store.find_by_username(&input.username).await?.is_some() {
            return Err(AccountError::DuplicateUsername(input.username));
        }

        let user = User {
            id: UserId::new(),
            username: input.username,
            email: input.email,
            password_hash: self.hasher.hash(&input.password)?,
            role: Role::Customer,
        };
        let user = self.store.insert(user).await?;
        tracing::info!(user_id = %user.id, "account registered");
        self.session_for(&user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AccountError> {
        let Some(user) = self.store.find_by_username(username).await? else {
            return Err(AccountError::InvalidCredentials);
        };
        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AccountError::InvalidCredentials);
        }
        self.session_for(&user)
    }

    pub async fn profile(&self, principal: &Principal) -> Result<UserView, AccountError> {
        self.store
            .get(principal.user_id)
            .await?
            .map(|u| u.view())
            .ok_or(AccountError::NotFound)
    }

    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<UserView>, AccountError> {
        require_admin(principal, Permission::UsersManage)?;
        Ok(self.store.list().await?.iter().map(User::view).collect())
    }

    /// `role` arrives as its wire name (`admin` / `cliente`).
    pub async fn update_role(
        &self,
        principal: &Principal,
        user_id: UserId,
        role: &str,
    ) -> Result<Role, AccountError> {
        require_admin(principal, Permission::UsersManage)?;
        let role: Role = role
            .parse()
            .map_err(|_| AccountError::InvalidRole(role.to_string()))?;

        if !self.store.set_role(user_id, role).await? {
            return Err(AccountError::NotFound);
        }
        tracing::info!(%user_id, %role, by = %principal.username, "role updated");
        Ok(role)
    }

    /// Returns the deleted account's username.
    pub async fn delete_user(&self, principal: &Principal, user_id: UserId) -> Result<String, AccountError> {
        require_admin(principal, Permission::UsersManage)?;
        let Some(user) = self.store.get(user_id).await? else {
            return Err(AccountError::NotFound);
        };
        if user.id == principal.user_id {
            return Err(AccountError::SelfDeletion);
        }
        if !self.store.delete(user_id).await? {
            return Err(AccountError::NotFound);
        }
        tracing::info!(%user_id, by = %principal.username, "account deleted");
        Ok(user.username)
    }

    /// Email a reset link to a registered address.
    ///
    /// Delivery failures are logged and never surfaced to the caller.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AccountError> {
        if self.store.find_by_email(email).await?.is_none() {
            return Err(AccountError::NotFound);
        }

        let token = self.reset_tokens.issue(email, Utc::now())?;
        let link = format!("{}/restablecer-contrasena/{}", self.public_base_url, token);
        let message = OutgoingEmail {
            to: email.to_string(),
            subject: "Recuperación de contraseña".to_string(),
            html_body: format!(
                "<p>Hola, hemos recibido una solicitud para restablecer tu contraseña.</p>\
                 <p>Si no has solicitado este cambio, ignora este mensaje.</p>\
                 <p>Para restablecer tu contraseña, haz clic en el siguiente enlace:</p>\
                 <a href=\"{link}\">Restablecer contraseña</a>"
            ),
        };

        if let Err(e) = self.mailer.send(message).await {
            tracing::warn!(error = %e, "password reset email not delivered");
        }
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AccountError> {
        let email = self
            .reset_tokens
            .verify(token, Utc::now())
            .map_err(|_| AccountError::InvalidResetToken)?;
        if new_password.is_empty() {
            return Err(DomainError::validation("password cannot be empty").into());
        }

        let hash = self.hasher.hash(new_password)?;
        if !self.store.set_password_hash(&email, hash).await? {
            return Err(AccountError::NotFound);
        }
        tracing::info!("password reset completed");
        Ok(())
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, AccountError> {
        let principal = user.principal();
        let token = self.tokens.issue(&principal, Utc::now())?;
        Ok(AuthSession { token, principal })
    }
}
