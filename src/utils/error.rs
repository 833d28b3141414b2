use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhaseError {
    #[error("time data '{input}' does not match format '%Y-%m-%d': {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("Ephemeris computation failed: {message}")]
    Ephemeris { message: String },

    #[error("Image index {index} is outside the image set range {min}..={max}")]
    ImageIndexOutOfRange { index: i64, min: u32, max: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller sent something we cannot interpret.
    Client,
    /// Computation failed for a well-formed request.
    Internal,
    /// The service was started with an unusable configuration.
    Configuration,
}

impl PhaseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PhaseError::InvalidDate { .. } | PhaseError::InvalidRequest(_) => ErrorCategory::Client,
            PhaseError::Ephemeris { .. } | PhaseError::ImageIndexOutOfRange { .. } => {
                ErrorCategory::Internal
            }
            PhaseError::IoError(_)
            | PhaseError::ConfigError { .. }
            | PhaseError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PhaseError::InvalidDate { .. } => "Send the date as YYYY-MM-DD, e.g. 2024-01-25",
            PhaseError::InvalidRequest(_) => {
                "Send a JSON object such as {\"date\": \"2024-01-25\"} or an empty body"
            }
            PhaseError::Ephemeris { .. } => "Try a date closer to the present era",
            PhaseError::ImageIndexOutOfRange { .. } => {
                "Check that images.min_index/max_index match the scales of the image set"
            }
            PhaseError::IoError(_) => "Check that the file exists and is readable",
            PhaseError::ConfigError { .. } | PhaseError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags and restart"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PhaseError>;
