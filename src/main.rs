use clap::Parser;
use mini_league_etl::utils::error::{ErrorSeverity, LeagueError};
use mini_league_etl::utils::{logger, validation::Validate};
use mini_league_etl::{CliConfig, EtlEngine, LeaguePipeline, LocalStorage};

fn exit_code(e: &LeagueError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(e: &LeagueError) {
    tracing::error!(
        "League analysis failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting mini-league-etl for league {}", config.league_id);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = match LeaguePipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            report_failure(&e);
            std::process::exit(exit_code(&e).max(1));
        }
    };

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output) => {
            println!("{}", output.summary);
            println!("✅ League analysis completed");
            println!("📁 Output saved to: {}", output.output_path);
        }
        Err(e) => {
            report_failure(&e);
            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
