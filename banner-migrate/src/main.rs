use banner_migrate::config::Config;
use banner_migrate::runner::Migration;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Normalize image reference fields on the banners collection.
///
/// Dry-run by default: prints planned updates without writing. Run
/// dry-run first, then pass --apply to persist.
#[derive(Debug, Parser)]
#[command(name = "banner-migrate", version)]
struct Args {
    /// Apply planned changes to the database instead of only printing them
    #[arg(long)]
    apply: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,banner_migrate=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let migration = Migration::connect(&config).await?;
    migration.run(args.apply).await?;

    Ok(())
}
