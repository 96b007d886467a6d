//! HRM API - Application entry point
//!
//! CLI-based entry point that dispatches to various commands.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use hrm_api::{
    cli::{Cli, Commands},
    commands,
    config::Config,
};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        if let Err(e) = dotenvy::from_path(path) {
            eprintln!("Could not load {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    // Load configuration
    let config = Config::from_env();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose, &config.log_dir);
    tracing::debug!(?config, "Configuration loaded");

    // Execute command
    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
    };

    // Handle errors
    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Append-only log file under `dir`; logging to stdout continues without it.
fn open_log(dir: &Path, name: &str) -> Option<Mutex<File>> {
    let path = dir.join(name);
    let file = fs::create_dir_all(dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
    match file {
        Ok(file) => Some(Mutex::new(file)),
        Err(e) => {
            eprintln!("Cannot write {}: {}", path.display(), e);
            None
        }
    }
}

/// Initialize tracing subscriber.
///
/// Besides stdout, events go to `app.log`, errors also to `error.log`,
/// and request traces from tower-http to `access.log`. The admin log
/// reader serves these files.
fn init_tracing(verbose: bool, log_dir: &Path) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".to_string())
    };

    let app_log = open_log(log_dir, "app.log")
        .map(|file| tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file));
    let error_log = open_log(log_dir, "error.log").map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file)
            .with_filter(LevelFilter::ERROR)
    });
    let access_log = open_log(log_dir, "access.log").map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file)
            .with_filter(Targets::new().with_target("tower_http", Level::DEBUG))
    });

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .with(app_log)
        .with(error_log)
        .with(access_log)
        .init();
}
