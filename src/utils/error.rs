use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeagueError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Resource not found: {resource}")]
    NotFoundError { resource: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("No standings could be retrieved for league {league_id}")]
    NoStandingsError { league_id: u64 },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LeagueError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LeagueError::ApiError(_)
            | LeagueError::HttpStatusError { .. }
            | LeagueError::NotFoundError { .. } => ErrorCategory::Network,
            LeagueError::ConfigError { .. }
            | LeagueError::MissingConfigError { .. }
            | LeagueError::InvalidConfigValueError { .. }
            | LeagueError::ConfigValidationError { .. }
            | LeagueError::UrlError(_) => ErrorCategory::Configuration,
            LeagueError::SerializationError(_)
            | LeagueError::NoStandingsError { .. }
            | LeagueError::ProcessingError { .. } => ErrorCategory::Data,
            LeagueError::ZipError(_) | LeagueError::CsvError(_) | LeagueError::IoError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LeagueError::NotFoundError { .. } => ErrorSeverity::Low,
            LeagueError::ApiError(_)
            | LeagueError::HttpStatusError { .. }
            | LeagueError::NoStandingsError { .. } => ErrorSeverity::Medium,
            LeagueError::IoError(_) | LeagueError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether the failure is likely to go away on a later run.
    pub fn is_transient(&self) -> bool {
        match self {
            LeagueError::ApiError(e) => e.is_timeout() || e.is_connect(),
            LeagueError::HttpStatusError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LeagueError::ApiError(_) | LeagueError::HttpStatusError { .. } => {
                "Check your network connection; the fantasy API may be updating, try again in a few minutes"
            }
            LeagueError::NotFoundError { .. } => "Check the league and manager IDs",
            LeagueError::NoStandingsError { .. } => {
                "Make sure the league ID refers to a classic league and that the season has started"
            }
            LeagueError::MissingConfigError { .. } => {
                "Provide the missing value on the command line or in the config file"
            }
            LeagueError::ConfigError { .. }
            | LeagueError::InvalidConfigValueError { .. }
            | LeagueError::ConfigValidationError { .. }
            | LeagueError::UrlError(_) => "Fix the configuration value and run again",
            LeagueError::IoError(_) | LeagueError::ZipError(_) | LeagueError::CsvError(_) => {
                "Check that the output directory exists and is writable"
            }
            LeagueError::SerializationError(_) | LeagueError::ProcessingError { .. } => {
                "Run with --verbose and report the log if the problem persists"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the fantasy API: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Could not process league data: {}", self),
            ErrorCategory::Output => format!("Could not write the report: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeagueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_network_and_medium() {
        let err = LeagueError::HttpStatusError {
            url: "https://example.com/entry/1/".to_string(),
            status: 503,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.is_transient());
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = LeagueError::MissingConfigError {
            field: "gameweek".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(!err.is_transient());
        assert!(err.user_friendly_message().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_not_found_is_low_severity() {
        let err = LeagueError::NotFoundError {
            resource: "entry/42/".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
    }
}
