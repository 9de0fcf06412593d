//! Service wiring: picks the store backend and builds the use-case services.

use std::sync::Arc;

use storefront_accounts::{AccountService, AccountStore, Mailer, ResetSettings};
use storefront_auth::{Argon2PasswordHasher, Hs256JwtValidator};
use storefront_catalog::CatalogStore;
use storefront_infra::{
    AppConfig, DbError, InMemoryAccountStore, InMemoryCatalogStore, LogMailer,
    PostgresAccountStore, PostgresCatalogStore, db,
};
use storefront_inventory::{CatalogService, CheckoutProcessor, StockAdministrator};

pub type SharedCatalogStore = Arc<dyn CatalogStore>;
pub type SharedAccountStore = Arc<dyn AccountStore>;

pub struct AppServices {
    pub catalog: CatalogService<SharedCatalogStore>,
    pub checkout: CheckoutProcessor<SharedCatalogStore>,
    pub stock_admin: StockAdministrator<SharedCatalogStore>,
    pub accounts: AccountService<SharedAccountStore>,
}

impl AppServices {
    pub fn new(
        config: &AppConfig,
        catalog_store: SharedCatalogStore,
        account_store: SharedAccountStore,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            catalog: CatalogService::new(catalog_store.clone()),
            checkout: CheckoutProcessor::new(catalog_store.clone()),
            stock_admin: StockAdministrator::new(catalog_store),
            accounts: AccountService::new(
                account_store,
                Arc::new(Argon2PasswordHasher::new()),
                mailer,
                Hs256JwtValidator::new(secret, config.token_ttl),
                secret,
                ResetSettings {
                    public_base_url: config.public_base_url.clone(),
                    max_age: config.reset_token_ttl,
                },
            ),
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryCatalogStore::new()),
            Arc::new(InMemoryAccountStore::new()),
            mailer,
        )
    }
}

/// Postgres when `DATABASE_URL` is set, in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, DbError> {
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);

    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory stores");
        return Ok(AppServices::in_memory(config, mailer));
    };

    let pool = db::connect(database_url).await?;
    db::migrate(&pool).await?;
    tracing::info!("using postgres stores");

    Ok(AppServices::new(
        config,
        Arc::new(PostgresCatalogStore::new(pool.clone())),
        Arc::new(PostgresAccountStore::new(pool)),
        mailer,
    ))
}
