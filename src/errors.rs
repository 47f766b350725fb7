use thiserror::Error;

#[derive(Error, Debug)]
pub enum WellbeingError {
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Producer failed: {0}")]
    ProducerFailure(String),

    #[error("Pagination contract violation: {0}")]
    PaginationContractViolation(String),

    #[error("Employee not found: id {0}")]
    EmployeeNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    Custom(String),
}

impl WellbeingError {
    /// Errors caused by the caller's input rather than by this service.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidScore(_) | Self::InvalidThresholds(_) | Self::EmployeeNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WellbeingError>;
