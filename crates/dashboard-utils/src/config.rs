//! Logging configuration

use serde::{Deserialize, Serialize};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration for a host process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive, used when `RUST_LOG` is unset
    pub filter: String,
    /// Line format
    pub format: LogFormat,
    /// Log prefix identifying the host (e.g. "dashboard_repl")
    pub prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn,stock_dashboard=info".to_string(),
            format: LogFormat::Pretty,
            prefix: "stock_dashboard".to_string(),
        }
    }
}

impl LogConfig {
    /// Create a config with the given host prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Override the default filter directive
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Switch to debug-level output for the dashboard crates
    pub fn debug(mut self, enabled: bool) -> Self {
        if enabled {
            self.filter = "info,stock_dashboard=debug".to_string();
        }
        self
    }

    /// Set the line format
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}
