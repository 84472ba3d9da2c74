//! Error types for dashboard operations

use thiserror::Error;

/// Dashboard specific errors
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Bad or missing user input; raised before any collaborator is called
    #[error("Validation error: {0}")]
    Validation(String),

    /// A backend collaborator reported a failure
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// Navigation label outside the fixed view set
    #[error("Unknown view: {0}")]
    Routing(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Broad error categories shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Collaborator,
    Routing,
    Config,
}

impl DashboardError {
    /// Shorthand for a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for a collaborator error
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    /// Classify the error; transport and decoding failures count as
    /// collaborator failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Routing(_) => ErrorKind::Routing,
            Self::Config(_) => ErrorKind::Config,
            Self::Collaborator(_) | Self::Network(_) | Self::Json(_) | Self::Other(_) => {
                ErrorKind::Collaborator
            }
        }
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Convert anyhow::Error to DashboardError
impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Other(format!("{err:#}"))
    }
}
