use anyhow::Context;
use clap::{Parser, Subcommand};

/// Book CRUD service over MongoDB and MySQL
#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the relational table if absent, then exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = bookstore_kernel::settings::Settings::load()
        .with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "bookstore CLI starting");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bookstore_app::bootstrap::run(&settings).await,
        Command::Migrate => bookstore_app::bootstrap::migrate(&settings).await,
    }
}
