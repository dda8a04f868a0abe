use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_stats::api::routes::stats::parse_regions;
use league_stats::api::state::AppState;
use league_stats::calculate::aggregate;
use league_stats::config::AppConfig;
use league_stats::models::HeroCatalog;
use league_stats::sync::SyncOrchestrator;

#[derive(Parser)]
#[command(name = "league-stats")]
#[command(about = "Dota 2 league superlatives from Stratz and OpenDota match data")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the league once, then serve reports over HTTP
    Serve {
        /// League id (overrides config)
        #[arg(long)]
        league: Option<u32>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Fetch the league once and print a report as JSON
    Report {
        /// League id (overrides config)
        #[arg(long)]
        league: Option<u32>,

        /// Comma-separated region ids
        #[arg(long)]
        regions: Option<String>,

        /// Lower bound on match end time (unix seconds, exclusive)
        #[arg(long, default_value_t = 0)]
        from: i64,

        /// Upper bound on match end time (unix seconds, exclusive, default now)
        #[arg(long)]
        to: Option<i64>,
    },

    /// List the hero catalog
    Heroes,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Initialize tracing
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting league-stats v{}", env!("CARGO_PKG_VERSION"));

    let heroes = HeroCatalog::from_file(&config.heroes_path)
        .with_context(|| format!("loading hero catalog {}", config.heroes_path.display()))?;
    tracing::info!("Loaded {} heroes", heroes.len());
    let heroes = Arc::new(heroes);

    match cli.command {
        Commands::Serve { league, host, port } => {
            let league_id = league.unwrap_or(config.league_id);
            let orchestrator = SyncOrchestrator::from_config(&config, heroes)?;
            let result = orchestrator.sync_league(league_id).await?;

            let state = AppState {
                league_id,
                matches: Arc::new(result.matches),
                default_regions: Arc::new(config.report.default_regions.clone()),
            };
            let app = league_stats::api::build_router(state);

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Serving league {} on http://{}", league_id, addr);
            axum::serve(listener, app).await?;
        }
        Commands::Report {
            league,
            regions,
            from,
            to,
        } => {
            let league_id = league.unwrap_or(config.league_id);
            let regions = match regions.as_deref() {
                Some(raw) => parse_regions(raw)?,
                None => None,
            }
            .unwrap_or_else(|| config.report.default_regions.clone());
            let to = to.unwrap_or_else(|| chrono::Utc::now().timestamp());

            let orchestrator = SyncOrchestrator::from_config(&config, heroes)?;
            let result = orchestrator.sync_league(league_id).await?;

            let report = aggregate(&result.matches, &regions, from, to)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Heroes => {
            for hero in heroes.sorted() {
                println!("{:>4}  {}", hero.id, hero.display_name);
            }
        }
    }

    Ok(())
}
