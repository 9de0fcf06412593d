//! Postgres-backed account store.
//!
//! Unique violations (`23505`) are told apart by constraint name: the `users`
//! table created in [`crate::db::migrate`] names them `users_email_key` and
//! `users_username_key`.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use storefront_accounts::{AccountStore, AccountStoreError, User};
use storefront_auth::Role;
use storefront_core::UserId;

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = AccountStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| AccountStoreError::InvalidRecord(format!("user {}: {e}", row.id)))?;
        Ok(User {
            id: UserId::from_uuid(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error, user: Option<&User>) -> AccountStoreError {
    if let (sqlx::Error::Database(db_err), Some(user)) = (&err, user) {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some("users_username_key") => {
                    AccountStoreError::DuplicateUsername(user.username.clone())
                }
                _ => AccountStoreError::DuplicateEmail(user.email.clone()),
            };
        }
    }
    tracing::error!(operation, error = %err, "account store query failed");
    AccountStoreError::Unavailable(format!("{operation}: {err}"))
}

const SELECT_USER: &str = "SELECT id, username, email, password_hash, role FROM users";

impl PostgresAccountStore {
    async fn fetch_one_where(
        &self,
        operation: &str,
        clause: &str,
        value: &str,
    ) -> Result<Option<User>, AccountStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE {clause} = $1"))
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e, None))?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn insert(&self, user: User) -> Result<User, AccountStoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e, Some(&user)))?;
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, AccountStoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e, None))?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AccountStoreError> {
        self.fetch_one_where("find_user_by_username", "username", username)
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountStoreError> {
        self.fetch_one_where("find_user_by_email", "email", email).await
    }

    async fn list(&self) -> Result<Vec<User>, AccountStoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!("{SELECT_USER} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e, None))?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<bool, AccountStoreError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_role", e, None))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_password_hash(&self, email: &str, hash: String) -> Result<bool, AccountStoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
            .bind(email)
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_password_hash", e, None))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: UserId) -> Result<bool, AccountStoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e, None))?;
        Ok(result.rows_affected() > 0)
    }
}
