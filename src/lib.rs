pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::FplClient;
pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{
    etl::{EtlEngine, RunOutput},
    pipeline::LeaguePipeline,
};
pub use domain::model::{AnalysisMode, LeagueReport, ManagerRow};
pub use utils::error::{LeagueError, Result};
