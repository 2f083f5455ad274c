// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

mod config;
mod drive;
mod google;
mod logging;
mod report;
mod server;
mod sheets;
mod stream;
mod submission;
#[cfg(test)]
mod test_utils;

use crate::config::Config;
use crate::drive::GoogleDrive;
use crate::google::ServiceAccountAuth;
use crate::report::ReportValidator;
use crate::sheets::GoogleSheets;
use crate::submission::Submitter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Accept guard reports over HTTP
    Serve {
        /// Address to listen on, overriding the configured one
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_found = Path::new(&cli.config).exists();
    let config = if config_found {
        match config::load_config(&cli.config) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load configuration from {}: {}", cli.config, e);
                process::exit(1);
            }
        }
    } else {
        Config::from_env()
    };

    let _log_guard = logging::init_logging(config.logging.as_ref(), cli.verbose)?;

    info!("Guard Report Service v{}", env!("CARGO_PKG_VERSION"));
    if config_found {
        info!("Loaded configuration from: {}", cli.config);
    } else {
        warn!(
            "Configuration file {} not found, using defaults and environment",
            cli.config
        );
    }

    match cli.command {
        Commands::Serve { bind } => serve(config, bind).await,
    }
}

/// Build the Google-backed pipeline and serve it until Ctrl-C
async fn serve(config: Config, bind: Option<String>) -> Result<()> {
    if let Err(e) = config.google.resolve() {
        error!("{}; submissions will fail until this is fixed", e);
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("guard-report/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let auth = Arc::new(ServiceAccountAuth::new(
        http.clone(),
        &config.google.token_uri,
    ));
    let drive = GoogleDrive::new(http.clone(), auth.clone(), &config.google);
    let sheets = GoogleSheets::new(http, auth, &config.google);

    let submitter = Submitter::new(
        drive,
        sheets,
        ReportValidator::new(config.validation.image_rules()),
        config.google.sheet_name.clone(),
    );
    info!(
        "Reports will be appended to sheet {}",
        submitter.sheet_name()
    );

    let body_limit = config.server.body_limit_mb * 1024 * 1024;
    let app = server::router(Arc::new(submitter), body_limit);

    let address = bind.unwrap_or(config.server.bind_address);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
