//! Catalog database health check.
//!
//! Connects to the hosted Postgres backend, runs a trivial query and counts
//! catalog rows. Exits non-zero when the database is unreachable.

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use vnshop::health::check_database;

/// Check connectivity to the storefront catalog database
#[derive(Parser)]
#[command(name = "vnshop-healthcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Seconds to wait for a connection
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())).init();
    let cli = Cli::parse();

    let report = check_database(&cli.database_url, Duration::from_secs(cli.timeout_secs)).await;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.healthy {
        println!("database healthy ({} ms)", report.latency_ms);
        println!("  products:   {}", report.products.map_or("n/a".to_string(), |n| n.to_string()));
        println!("  categories: {}", report.categories.map_or("n/a".to_string(), |n| n.to_string()));
    } else {
        eprintln!("database unhealthy: {}", report.error.as_deref().unwrap_or("unknown error"));
    }

    if !report.healthy {
        std::process::exit(1);
    }
    Ok(())
}
