//! Trust center content server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trustcenter_core::config::AppConfig;
use trustcenter_db::Seeder;
use trustcenter_server::{AppState, create_router};

/// Trust center content server
#[derive(Parser, Debug)]
#[command(name = "trustd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "TRUSTCENTER_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,

    /// Reseed the database from the configured data directory before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Trust center server v{}", env!("CARGO_PKG_VERSION"));

    // The file is optional; built-in defaults target a local Postgres and
    // TRUSTCENTER_* variables override both.
    let mut figment = Figment::new();
    if std::path::Path::new(&args.config).exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::info!(
            config_path = %args.config,
            "No config file found, using defaults and environment"
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("TRUSTCENTER_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    trustcenter_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let store = trustcenter_db::from_config(&config.database)
        .await
        .context("failed to connect to the content database")?;
    tracing::info!("Content database connected");

    if args.seed {
        let report = Seeder::new(store.clone())
            .seed(&config.seed.data_dir)
            .await
            .context("seeding failed")?;
        for (file, outcome) in &report {
            if !outcome.is_imported() {
                tracing::warn!(file = %file, outcome = ?outcome, "CSV file was not imported");
            }
        }
    }

    let state = AppState::new(config.clone(), store);

    let sweep_interval = state.sweep_interval();
    let _sweeper = state.cache.spawn_sweeper(sweep_interval);
    tracing::info!(
        ttl_secs = config.cache.ttl_secs,
        interval_secs = sweep_interval.as_secs(),
        "Cache sweeper spawned"
    );

    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
