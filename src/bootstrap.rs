//! Process lifecycle: open handles, initialize modules, serve, tear down.

use anyhow::Context;
use bookstore_db::Databases;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Run the HTTP service until a shutdown signal arrives.
///
/// An unreachable store or a failed table creation is logged and does not
/// stop the process; only that store's routes are affected.
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let db = Databases::connect(settings.database.connect_options())
        .await
        .context("failed to construct database handles")?;
    db.probe().await;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db);

    let ctx = InitCtx {
        settings,
        db: &db,
    };

    registry.init_modules(&ctx).await?;

    let failed = registry.run_migrations(&ctx).await;
    if failed > 0 {
        tracing::warn!(failed, "continuing without all migrations applied");
    }

    registry.start_modules(&ctx).await?;

    let served = bookstore_http::start_server(&registry, settings).await;

    if let Err(err) = registry.stop_modules().await {
        tracing::error!(error = ?err, "module shutdown failed");
    }
    db.close().await;

    served
}

/// Apply every module migration once and exit.
pub async fn migrate(settings: &Settings) -> anyhow::Result<()> {
    let db = Databases::connect(settings.database.connect_options())
        .await
        .context("failed to construct database handles")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db);

    let ctx = InitCtx {
        settings,
        db: &db,
    };
    let failed = registry.run_migrations(&ctx).await;
    db.close().await;

    if failed > 0 {
        anyhow::bail!("{failed} migration(s) failed");
    }

    tracing::info!("all migrations applied");
    Ok(())
}
