use thiserror::Error;

/// Error type for dashboard operations
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Dataset could not be loaded
    #[error("Load error: {0}")]
    LoadError(String),
    /// A dataset row or value could not be parsed
    #[error("Parse error at row {row}: {message}")]
    ParseError { row: usize, message: String },
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Template or chart rendering failed
    #[error("Render error: {0}")]
    RenderError(String),
    /// Requested startup or investor does not exist in the dataset
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl DashboardError {
    /// Stable code used in JSON error responses
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::LoadError(_) | DashboardError::Csv(_) => "DATASET_LOAD_FAILED",
            DashboardError::ParseError { .. } => "DATASET_PARSE_FAILED",
            DashboardError::ConfigError(_) | DashboardError::Toml(_) => "INVALID_CONFIG",
            DashboardError::RenderError(_) => "RENDER_FAILED",
            DashboardError::NotFound(_) => "NOT_FOUND",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
