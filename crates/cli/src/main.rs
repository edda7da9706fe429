use std::sync::Arc;

use anyhow::Context;
use bookshelf_app::books::store::PgBookStore;
use bookshelf_kernel::settings::{Environment, Settings};
use clap::{Parser, Subcommand};

/// Bookshelf book records service
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    /// Environment whose config overlay is loaded (local, test, staging, production)
    #[arg(long, global = true, env = "BOOKSHELF_ENV")]
    env: Option<Environment>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations, then serve HTTP
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the effective configuration target and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings =
        Settings::load_for(cli.env).with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::debug!(command = ?cli.command, env = ?settings.environment, "running command");

    match cli.command {
        Command::Serve => bookshelf_app::serve(settings).await,
        Command::Migrate => migrate(&settings).await,
        Command::CheckConfig => {
            println!("environment: {}", settings.environment.as_str());
            println!("listen:      {}", settings.server.bind_address());
            println!("database:    {}", settings.database.redacted_url());
            Ok(())
        }
    }
}

async fn migrate(settings: &Settings) -> anyhow::Result<()> {
    let pool = bookshelf_db::connect(&settings.database).await?;
    let registry = bookshelf_app::build_registry(Arc::new(PgBookStore::new(pool.clone())))?;

    let applied = bookshelf_app::migrate(&pool, &registry).await?;
    tracing::info!(applied = applied.len(), "migrate command finished");
    if applied.is_empty() {
        println!("database is up to date");
    }
    for key in applied {
        println!("applied {}", key);
    }

    pool.close().await;
    Ok(())
}
