use anyhow::Context;
use bookstore_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        port = settings.server.port,
        "bookstore-app bootstrap starting"
    );

    bookstore_app::bootstrap::run(&settings).await
}
