use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use movie_tracker::config::AppConfig;
use movie_tracker::console::{self, Console};
use movie_tracker::logging::init_logging;
use movie_tracker::{Database, OmdbClient, SessionController};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extra configuration file, layered over config/default and config/local
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides database.path)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error (overrides logging.level)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
        config.validate()?;
    }

    // Initialize logging
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        config.logging.file_path.as_deref().map(Path::new),
        config.logging.format == "json",
    )?;

    info!("Starting movie-tracker");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(run_app(&config, cli.database));

    // Stdin is read on a blocking thread that cannot be cancelled
    runtime.shutdown_background();
    result
}

async fn run_app(config: &AppConfig, database: Option<PathBuf>) -> Result<()> {
    let db_path = database.unwrap_or_else(|| PathBuf::from(&config.database.path));
    let db = Database::open(&db_path).with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    let lookup = OmdbClient::from_config(&config.lookup, &config.get_api_key())?;
    let mut session = SessionController::new(&db, lookup, config.security.bcrypt_cost);
    let mut console = Console::stdio();

    let outcome = console::run(&mut session, &mut console).await;
    drop(session);

    if let Err(err) = &outcome {
        error!(error = %err, "Session ended with an error");
    }

    db.close().context("Failed to close database")?;
    info!("Goodbye");

    outcome.context("Movie tracker stopped unexpectedly")
}
