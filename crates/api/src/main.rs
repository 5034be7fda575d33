use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use redactedhook_api::background::{cache_sweep, config_reload};
use redactedhook_api::cli::{self, Cli, Command};
use redactedhook_api::config::{ConfigStore, EnvOverrides};
use redactedhook_api::router::build_app_router;
use redactedhook_api::state::AppState;
use redactedhook_api::telemetry;
use redactedhook_indexer::cache::SWEEP_INTERVAL;
use redactedhook_indexer::{IndexerApi, MetadataCache, MetadataFetcher, RateBudgets};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::GenerateApitoken => {
            println!("API Token: {}", cli::generate_api_token());
            println!("Copy and paste this token into your config file under [authorization] api_token");
            ExitCode::SUCCESS
        }
        Command::CreateConfig => match cli::create_config(&cli.config) {
            Ok(()) => {
                println!("Config file created at {}", cli.config.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
        Command::Health => {
            if cli::check_health(&cli.config).await {
                println!("Healthy");
                ExitCode::SUCCESS
            } else {
                println!("Unhealthy");
                ExitCode::FAILURE
            }
        }
        Command::Serve => match serve(&cli.config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = ?e, "Server exited with an error");
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn serve(config_path: &Path) -> anyhow::Result<()> {
    // --- Configuration ---
    let store = Arc::new(
        ConfigStore::load(config_path, EnvOverrides::from_env())
            .context("Failed to load configuration")?,
    );
    let config = store.current();

    // --- Tracing ---
    let _log_guard = telemetry::init(&config.logs)?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        path = %config_path.display(),
        "Loaded configuration"
    );

    // --- Fetcher ---
    let http = reqwest::Client::builder()
        .user_agent(concat!("redactedhook/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let cache = Arc::new(MetadataCache::new());
    let fetcher = MetadataFetcher::new(
        Arc::clone(&cache),
        Arc::new(RateBudgets::default()),
        Arc::new(IndexerApi::with_client(http.clone(), config.endpoints())),
    );

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(cache_sweep::run(
        Arc::clone(&cache),
        SWEEP_INTERVAL,
        cancel.clone(),
    ));
    let reload_handle = tokio::spawn(config_reload::run(
        Arc::clone(&store),
        config_reload::POLL_INTERVAL,
        cancel.clone(),
    ));

    // --- Router ---
    let state = AppState::new(Arc::clone(&store), fetcher, http);
    let app = build_app_router(state);

    // --- Start server ---
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), reload_handle).await;
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
