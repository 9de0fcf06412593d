//! Postgres connection and schema bootstrap.

use sqlx::PgPool;

/// Connection and schema errors surface as raw `sqlx` errors.
pub type DbError = sqlx::Error;

/// Schema statements, applied in order. Each is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        price       NUMERIC NOT NULL CHECK (price >= 0),
        code        TEXT NOT NULL,
        category    TEXT NOT NULL,
        image       TEXT NOT NULL,
        description TEXT NULL,
        stock       BIGINT NOT NULL DEFAULT 0 CHECK (stock >= 0),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT products_code_key UNIQUE (code)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL DEFAULT 'cliente',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_username_key UNIQUE (username),
        CONSTRAINT users_email_key UNIQUE (email)
    )
    "#,
];

pub async fn connect(database_url: &str) -> Result<PgPool, DbError> {
    PgPool::connect(database_url).await
}

/// Create the `products` and `users` tables if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> Result<(), DbError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(tables = SCHEMA.len(), "database schema ready");
    Ok(())
}
