pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use crate::adapters::http::DEFAULT_BASE_URL;
    use crate::core::ConfigProvider;
    use crate::domain::api::ManagerId;
    use crate::domain::model::AnalysisMode;
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_gameweek, validate_path, validate_positive_number, validate_range, validate_url,
        Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "mini-league-etl")]
    #[command(about = "Fetches and analyses a fantasy football mini-league")]
    pub struct CliConfig {
        /// Classic league ID
        #[arg(long)]
        pub league_id: u64,

        /// Gameweek to analyse; defaults to the current one
        #[arg(long)]
        pub gameweek: Option<u32>,

        #[arg(long, default_value = "10")]
        pub top_n: usize,

        /// Fetch the whole league and adjust everyone's points
        #[arg(long)]
        pub full: bool,

        /// Maximum number of standings rows
        #[arg(long)]
        pub limit: Option<usize>,

        /// Only keep these managers (comma separated)
        #[arg(long, value_delimiter = ',')]
        pub manager_ids: Vec<ManagerId>,

        #[arg(long, default_value = DEFAULT_BASE_URL)]
        pub base_url: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, default_value = "10")]
        pub concurrent_requests: usize,

        #[arg(long, default_value = "20")]
        pub analysis_concurrency: usize,

        #[arg(long, default_value = "10")]
        pub page_timeout_secs: u64,

        #[arg(long, default_value = "5")]
        pub entry_timeout_secs: u64,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        #[arg(long, help = "Log process CPU and memory per phase")]
        pub monitor: bool,
    }

    impl ConfigProvider for CliConfig {
        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn league_id(&self) -> u64 {
            self.league_id
        }

        fn gameweek(&self) -> Option<u32> {
            self.gameweek
        }

        fn top_n(&self) -> usize {
            self.top_n
        }

        fn mode(&self) -> AnalysisMode {
            if self.full {
                AnalysisMode::Full
            } else {
                AnalysisMode::Quick
            }
        }

        fn limit(&self) -> Option<usize> {
            self.limit
        }

        fn manager_filter(&self) -> Option<&[ManagerId]> {
            if self.manager_ids.is_empty() {
                None
            } else {
                Some(&self.manager_ids)
            }
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn concurrent_requests(&self) -> usize {
            self.concurrent_requests
        }

        fn analysis_concurrency(&self) -> usize {
            self.analysis_concurrency
        }

        fn page_timeout(&self) -> Duration {
            Duration::from_secs(self.page_timeout_secs)
        }

        fn entry_timeout(&self) -> Duration {
            Duration::from_secs(self.entry_timeout_secs)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_range("league_id", self.league_id, 1, u64::MAX)?;
            validate_gameweek("gameweek", self.gameweek)?;
            validate_positive_number("top_n", self.top_n, 1)?;
            if let Some(limit) = self.limit {
                validate_positive_number("limit", limit, 1)?;
            }
            validate_url("base_url", &self.base_url)?;
            validate_path("output_path", &self.output_path)?;
            validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
            validate_positive_number("analysis_concurrency", self.analysis_concurrency, 1)?;
            validate_range("page_timeout_secs", self.page_timeout_secs, 1, 300)?;
            validate_range("entry_timeout_secs", self.entry_timeout_secs, 1, 300)?;
            Ok(())
        }
    }

}
