use anyhow::Context;
use clap::Parser;
use mini_league_etl::core::ConfigProvider;
use mini_league_etl::utils::error::ErrorSeverity;
use mini_league_etl::utils::{logger, validation::Validate};
use mini_league_etl::{EtlEngine, LeaguePipeline, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-league")]
#[command(about = "Mini-league analysis driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "league.toml")]
    config: String,

    /// Analyse this division instead of the one in the config file
    #[arg(short, long)]
    division: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show the resolved configuration without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Loading configuration from: {}", args.config);

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if let Some(division) = &args.division {
        config.select_division(division.as_str());
        tracing::info!("Division overridden to: {}", division);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("Dry run, nothing fetched");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = LeaguePipeline::new(storage, config).context("failed to build API client")?;
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output) => {
            println!("{}", output.summary);
            println!("✅ League analysis completed");
            println!("📁 Output saved to: {}", output.output_path);
        }
        Err(e) => {
            tracing::error!(
                "League analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  League: {}", config.league_id());
    match config.gameweek() {
        Some(gw) => println!("  Gameweek: {}", gw),
        None => println!("  Gameweek: current"),
    }
    println!("  Mode: {:?}", config.mode());
    println!("  Top N: {}", config.top_n());
    if let Some(limit) = config.standings_limit() {
        println!("  Standings limit: {}", limit);
    }
    if let (Some(division), Some(ids)) = (&config.league.division, config.manager_filter()) {
        println!("  Division: {} ({} managers)", division, ids.len());
    }
    println!("  Source: {}", config.base_url());
    println!("  Output: {}", config.output_path());
    println!(
        "  Concurrency: {} standings / {} analysis",
        config.concurrent_requests(),
        config.analysis_concurrency()
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
}
