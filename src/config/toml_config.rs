use crate::adapters::http::{DEFAULT_BASE_URL, DEFAULT_ENTRY_TIMEOUT, DEFAULT_PAGE_TIMEOUT};
use crate::core::ConfigProvider;
use crate::domain::api::ManagerId;
use crate::domain::model::AnalysisMode;
use crate::utils::error::{LeagueError, Result};
use crate::utils::validation::{
    validate_gameweek, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub league: LeagueConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
    /// Named groups of managers; `league.division` selects one of them.
    #[serde(default)]
    pub divisions: BTreeMap<String, Vec<ManagerId>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub id: u64,
    pub gameweek: Option<u32>,
    pub top_n: Option<usize>,
    pub mode: Option<AnalysisMode>,
    pub limit: Option<usize>,
    pub division: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub page_timeout_seconds: Option<u64>,
    pub entry_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    pub concurrent_requests: Option<usize>,
    pub analysis_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LeagueError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LeagueError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LeagueError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Switches the manager filter to another configured division.
    pub fn select_division(&mut self, name: impl Into<String>) {
        self.league.division = Some(name.into());
    }

    pub fn division_names(&self) -> impl Iterator<Item = &str> {
        self.divisions.keys().map(String::as_str)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().is_some_and(|m| m.enabled)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_range("league.id", self.league.id, 1, u64::MAX)?;
        validate_gameweek("league.gameweek", self.league.gameweek)?;
        validate_positive_number("league.top_n", self.top_n(), 1)?;
        if let Some(limit) = self.league.limit {
            validate_positive_number("league.limit", limit, 1)?;
        }

        validate_url("source.base_url", self.base_url())?;
        validate_range(
            "source.page_timeout_seconds",
            self.page_timeout().as_secs(),
            1,
            300,
        )?;
        validate_range(
            "source.entry_timeout_seconds",
            self.entry_timeout().as_secs(),
            1,
            300,
        )?;

        validate_positive_number("fetch.concurrent_requests", self.concurrent_requests(), 1)?;
        validate_positive_number(
            "fetch.analysis_concurrency",
            self.analysis_concurrency(),
            1,
        )?;
        validate_path("output.path", &self.output.path)?;

        if let Some(division) = &self.league.division {
            validate_non_empty_string("league.division", division)?;
            match self.divisions.get(division) {
                None => {
                    return Err(LeagueError::InvalidConfigValueError {
                        field: "league.division".to_string(),
                        value: division.clone(),
                        reason: format!(
                            "Unknown division. Configured divisions: {}",
                            self.division_names().collect::<Vec<_>>().join(", ")
                        ),
                    })
                }
                Some(ids) if ids.is_empty() => {
                    return Err(LeagueError::ConfigValidationError {
                        field: format!("divisions.{}", division),
                        message: "Division has no managers".to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn league_id(&self) -> u64 {
        self.league.id
    }

    fn gameweek(&self) -> Option<u32> {
        self.league.gameweek
    }

    fn top_n(&self) -> usize {
        self.league.top_n.unwrap_or(10)
    }

    fn mode(&self) -> AnalysisMode {
        self.league.mode.unwrap_or(AnalysisMode::Quick)
    }

    fn limit(&self) -> Option<usize> {
        self.league.limit
    }

    fn manager_filter(&self) -> Option<&[ManagerId]> {
        self.league
            .division
            .as_ref()
            .and_then(|name| self.divisions.get(name))
            .map(Vec::as_slice)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn concurrent_requests(&self) -> usize {
        self.fetch.concurrent_requests.unwrap_or(10)
    }

    fn analysis_concurrency(&self) -> usize {
        self.fetch.analysis_concurrency.unwrap_or(20)
    }

    fn page_timeout(&self) -> Duration {
        self.source
            .page_timeout_seconds
            .map_or(DEFAULT_PAGE_TIMEOUT, Duration::from_secs)
    }

    fn entry_timeout(&self) -> Duration {
        self.source
            .entry_timeout_seconds
            .map_or(DEFAULT_ENTRY_TIMEOUT, Duration::from_secs)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
