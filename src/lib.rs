pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod game;
pub mod scheduler;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
pub use config::Config;
use db::Store;
use scheduler::Scheduler;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = cli::Cli::parse();

    match cli.command {
        None | Some(cli::Commands::Serve) => run_server(config, prometheus_handle).await,

        Some(cli::Commands::Check) => run_single_check(config).await,

        Some(cli::Commands::Init) => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        Some(cli::Commands::Vaults) => cmd_list_vaults(&config).await,

        Some(cli::Commands::ResetPassword { username, password }) => {
            cmd_reset_password(&config, &username, &password).await
        }
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Lootvault v{} starting...", env!("CARGO_PKG_VERSION"));

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    let api_state = api::create_app_state(shared.clone(), prometheus_handle);

    let scheduler_handle = if config.scheduler.enabled {
        let scheduler = Scheduler::new(shared.clone(), config.scheduler.clone());
        Some(tokio::spawn(async move {
            if let Err(e) = scheduler.start().await {
                error!("Scheduler error: {}", e);
            }
        }))
    } else {
        None
    };

    let port = config.server.port;
    let app = api::router(api_state).await;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    if let Some(handle) = scheduler_handle {
        handle.abort();
    }
    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

async fn run_single_check(config: Config) -> anyhow::Result<()> {
    info!("Running single maintenance pass...");

    let shared = Arc::new(SharedState::new(config.clone()).await?);
    let scheduler = Scheduler::new(shared, config.scheduler.clone());

    scheduler.run_once().await?;

    info!("Maintenance pass complete");
    Ok(())
}

async fn cmd_list_vaults(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let vaults = store.list_vaults().await?;

    if vaults.is_empty() {
        println!("No vaults yet. Run the server and start a hunt.");
        return Ok(());
    }

    println!("Vaults ({} total)", vaults.len());
    println!("{:-<70}", "");

    for vault in vaults {
        let lock_indicator = if vault.is_locked { "🔒" } else { "🔓" };
        let mut badges = String::new();
        if vault.is_new {
            badges.push_str(" [NEW]");
        }
        if vault.is_popular {
            badges.push_str(" [HOT]");
        }

        println!("{} {}{}", lock_indicator, vault.name, badges);
        println!(
            "  ID: {} | Difficulty: {} | Items: {} | Attempts: {} | Winners: {}",
            vault.id, vault.difficulty, vault.item_amount, vault.attempts, vault.winners
        );
    }

    println!();
    println!("Legend: 🔒 Locked | 🔓 Open");

    Ok(())
}

async fn cmd_reset_password(
    config: &Config,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    if password.len() < 8 {
        println!("Password must be at least 8 characters.");
        return Ok(());
    }

    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_username(username).await?.is_none() {
        println!("User '{username}' not found.");
        return Ok(());
    }

    store
        .update_user_password(username, password, Some(&config.security))
        .await?;

    println!("✓ Password updated for '{username}'");
    Ok(())
}
