//! `zenflow` command-line entry point.
//!
//! # Responsibility
//! - Parse process configuration (flags, env, `.env`).
//! - Start logging, open the studio database and dispatch one command.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Command;
use std::path::PathBuf;
use zenflow_core::{default_log_level, init_logging, init_stderr_logging, open_db, SqliteKvStore, StudioStore};

#[derive(Debug, Parser)]
#[command(name = "zenflow", version, about = "Members, classes and attendance for a small yoga studio")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, env = "ZENFLOW_DB", default_value = "zenflow.sqlite3")]
    db: PathBuf,

    /// Write rolling log files here instead of stderr.
    #[arg(long, global = true, env = "ZENFLOW_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "ZENFLOW_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    start_logging(&cli)?;

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let kv = SqliteKvStore::try_new(&conn)?;
    let mut store = StudioStore::open(kv).context("failed to load studio data")?;

    commands::run(&mut store, cli.command).await
}

fn start_logging(cli: &Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    match &cli.log_dir {
        Some(dir) => {
            let dir = if dir.is_absolute() {
                dir.clone()
            } else {
                std::env::current_dir()
                    .context("failed to resolve current directory")?
                    .join(dir)
            };
            init_logging(level, &dir.to_string_lossy())?;
        }
        None => init_stderr_logging(level)?,
    }
    Ok(())
}
