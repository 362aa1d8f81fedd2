//! trustctl - administrative CLI for the trust center content service.

mod api_client;

use anyhow::{Context, Result};
use api_client::{ApiClient, CacheStatsResponse};
use clap::{Args, Parser, Subcommand};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::path::{Path, PathBuf};
use trustcenter_core::Resource;
use trustcenter_core::config::AppConfig;
use trustcenter_core::convert::{ConvertOutcome, convert_directory};
use trustcenter_db::{FileOutcome, SeedReport, Seeder, TableDescription};

#[derive(Parser)]
#[command(name = "trustctl")]
#[command(about = "Administrative CLI for the trust center content service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "TRUSTCENTER_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[derive(Args, Clone)]
struct ApiArgs {
    /// Server base URL
    #[arg(long, env = "TRUSTCENTER_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop, recreate and bulk load one table per CSV file
    Seed {
        /// Directory of CSV files (overrides seed.data_dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Print the per-file report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// List content tables and their columns
    Describe {
        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Convert GraphQL relay JSON exports into CSV files
    Convert {
        /// Directory of JSON files (overrides seed.data_dir)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show cache statistics
    Stats {
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Clear cached content
    ClearCache {
        /// Resource to clear (teams, controls, faqs); clears everything when omitted
        #[arg(long)]
        resource: Option<Resource>,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Check server health and version
    Health {
        #[command(flatten)]
        api: ApiArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::Seed {
            data_dir,
            json,
            config,
        } => handle_seed_command(data_dir, json, &config).await,
        Commands::Describe { json, config } => handle_describe_command(json, &config).await,
        Commands::Convert { data_dir, config } => handle_convert_command(data_dir, &config),
        Commands::Stats { api } => handle_stats_command(&api).await,
        Commands::ClearCache { resource, api } => {
            handle_clear_cache_command(resource, &api).await
        }
        Commands::Health { api } => handle_health_command(&api).await,
    }
}

/// Load configuration the same way the server does: optional TOML file,
/// then `TRUSTCENTER_*` environment overrides.
fn load_config(args: &ConfigArgs) -> Result<AppConfig> {
    let mut figment = Figment::new();
    if Path::new(&args.config).exists() {
        tracing::debug!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("TRUSTCENTER_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    Ok(config)
}

async fn handle_seed_command(
    data_dir: Option<PathBuf>,
    json: bool,
    args: &ConfigArgs,
) -> Result<()> {
    let config = load_config(args)?;
    let data_dir = data_dir.unwrap_or(config.seed.data_dir);
    tracing::info!(data_dir = %data_dir.display(), "Seeding content tables");

    let store = trustcenter_db::from_config(&config.database)
        .await
        .context("failed to connect to the content database")?;
    let report = Seeder::new(store)
        .seed(&data_dir)
        .await
        .context("seeding failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_seed_report(&data_dir, &report);
    }
    Ok(())
}

fn render_seed_report(data_dir: &Path, report: &SeedReport) {
    if report.is_empty() {
        println!("No CSV files found in {}", data_dir.display());
        return;
    }

    println!("{:<36} RESULT", "FILE");
    println!("{}", "-".repeat(72));
    for (file, outcome) in report {
        match outcome {
            FileOutcome::Imported { rows_imported } => {
                println!("{file:<36} imported {rows_imported} rows")
            }
            FileOutcome::Failed { error } => println!("{file:<36} failed: {error}"),
        }
    }

    let imported = report.values().filter(|o| o.is_imported()).count();
    println!("\n{imported} of {} files imported", report.len());
}

async fn handle_describe_command(json: bool, args: &ConfigArgs) -> Result<()> {
    let config = load_config(args)?;
    let store = trustcenter_db::from_config(&config.database)
        .await
        .context("failed to connect to the content database")?;
    let tables = store.describe_tables().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
    } else {
        render_tables(&tables);
    }
    Ok(())
}

fn render_tables(tables: &[TableDescription]) {
    if tables.is_empty() {
        println!("No tables found.");
        return;
    }

    for table in tables {
        println!("{}", table.name);
        for column in &table.columns {
            let nullable = if column.nullable { "" } else { " NOT NULL" };
            println!("  {:<28} {}{}", column.name, column.data_type, nullable);
        }
        println!();
    }
}

fn handle_convert_command(data_dir: Option<PathBuf>, args: &ConfigArgs) -> Result<()> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => load_config(args)?.seed.data_dir,
    };

    let results = convert_directory(&data_dir)
        .with_context(|| format!("failed to convert {}", data_dir.display()))?;

    if results.is_empty() {
        println!("No JSON files found in {}", data_dir.display());
        return Ok(());
    }

    for (file, outcome) in &results {
        match outcome {
            ConvertOutcome::Converted {
                csv_filename,
                record_count,
                headers,
            } => println!(
                "{file} -> {csv_filename} ({record_count} records, {} columns)",
                headers.len()
            ),
            ConvertOutcome::Failed { error } => println!("{file}: skipped ({error})"),
        }
    }
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

fn render_stats(stats: &CacheStatsResponse) {
    println!("Cache Statistics:");
    println!("  Keys: {}", stats.keys);
    println!("  Hits: {}", stats.hits);
    println!("  Misses: {}", stats.misses);
    println!("  Key size: {}", format_bytes(stats.ksize));
    println!("  Value size: {}", format_bytes(stats.vsize));
}

async fn handle_stats_command(api: &ApiArgs) -> Result<()> {
    let client = ApiClient::new(&api.server)?;
    let stats = client.cache_stats().await?;
    render_stats(&stats);
    Ok(())
}

async fn handle_clear_cache_command(resource: Option<Resource>, api: &ApiArgs) -> Result<()> {
    let client = ApiClient::new(&api.server)?;
    let response = client.clear_cache(resource.map(Resource::as_str)).await?;
    if !response.success {
        anyhow::bail!("server did not clear the cache: {}", response.message);
    }
    println!("{} ({})", response.message, response.timestamp);
    render_stats(&response.stats);
    Ok(())
}

async fn handle_health_command(api: &ApiArgs) -> Result<()> {
    let client = ApiClient::new(&api.server)?;
    let health = client.health().await?;

    println!("Status: {}", health.status);
    println!("Server version: {}", health.version);
    println!("Client version: {}", env!("CARGO_PKG_VERSION"));

    if health.version != env!("CARGO_PKG_VERSION") {
        eprintln!(
            "Warning: version mismatch (server: {}, client: {})",
            health.version,
            env!("CARGO_PKG_VERSION")
        );
    }
    Ok(())
}
