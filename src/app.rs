use std::sync::Arc;

use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use bookshelf_kernel::{InitCtx, ModuleRegistry};
use sqlx::PgPool;

use crate::modules::{self, books::store::BookStore};

/// Registry holding every application module, backed by `store`
pub fn build_registry(store: Arc<dyn BookStore>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store)?;
    Ok(registry)
}

/// Apply pending migrations of every module and return the applied keys
pub async fn migrate(pool: &PgPool, registry: &ModuleRegistry) -> anyhow::Result<Vec<String>> {
    let migrations = registry.collect_migrations();
    bookshelf_db::run_migrations(pool, &migrations)
        .await
        .context("failed to apply migrations")
}

/// Connect, migrate, and serve HTTP until a shutdown signal arrives
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.redacted_url(),
        "bookshelf bootstrap starting"
    );

    let pool = bookshelf_db::connect(&settings.database).await?;
    let store = Arc::new(modules::books::store::PgBookStore::new(pool.clone()));
    let registry = build_registry(store)?;

    migrate(&pool, &registry).await?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    pool.close().await;

    served
}
