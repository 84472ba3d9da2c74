//! Configuration for the dashboard controller

use crate::error::{DashboardError, Result};
use crate::models::ReportType;
use crate::request::{DAYS_BACK_OPTIONS, PAGE_SIZE_OPTIONS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Configuration for a dashboard session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the backend REST API
    pub api_base: String,

    /// Per-request timeout handed to the HTTP collaborators
    pub request_timeout: Duration,

    /// Report type preselected on the analysis form
    pub default_report_type: ReportType,

    /// Days-back option preselected on the history form
    pub default_days_back: u32,

    /// Page size preselected on the history form
    pub default_page_size: u32,

    /// Number of tasks fetched by the task monitor
    pub task_list_limit: usize,

    /// Period requested for the quote K-line history
    pub kline_period: String,

    /// Number of days requested for the quote K-line history
    pub kline_days: u32,

    /// Run mode label shown in the navigation sidebar
    pub run_mode: String,

    /// HTTP proxy for backend requests (optional)
    pub proxy: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(120), // analysis runs are slow
            default_report_type: ReportType::Detailed,
            default_days_back: 30,
            default_page_size: 20,
            task_list_limit: 50,
            kline_period: "daily".to_string(),
            kline_days: 30,
            run_mode: "Terminal UI".to_string(),
            proxy: None,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(base) = lookup("DASHBOARD_API_BASE") {
            builder = builder.api_base(base);
        }

        if let Some(secs) = lookup("DASHBOARD_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DashboardError::Config(format!("DASHBOARD_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        if let Some(report_type) = lookup("DASHBOARD_REPORT_TYPE") {
            builder = builder.default_report_type(report_type.parse()?);
        }

        // CI runners never go through the local proxy
        let in_ci = lookup("GITHUB_ACTIONS").is_some_and(|v| v == "true");
        let use_proxy = lookup("USE_PROXY").is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if use_proxy && !in_ci {
            let host = lookup("PROXY_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
            let port = lookup("PROXY_PORT").unwrap_or_else(|| "10809".to_string());
            builder = builder.proxy(format!("http://{host}:{port}"));
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(DashboardError::Config("api_base must not be empty".to_string()));
        }

        url::Url::parse(&self.api_base).map_err(|e| {
            DashboardError::Config(format!("api_base is not a valid URL ({}): {e}", self.api_base))
        })?;

        if self.request_timeout.is_zero() {
            return Err(DashboardError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if !DAYS_BACK_OPTIONS.contains(&self.default_days_back) {
            return Err(DashboardError::Config(format!(
                "default_days_back must be one of {DAYS_BACK_OPTIONS:?}"
            )));
        }

        if !PAGE_SIZE_OPTIONS.contains(&self.default_page_size) {
            return Err(DashboardError::Config(format!(
                "default_page_size must be one of {PAGE_SIZE_OPTIONS:?}"
            )));
        }

        if self.task_list_limit == 0 {
            return Err(DashboardError::Config(
                "task_list_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    api_base: Option<String>,
    request_timeout: Option<Duration>,
    default_report_type: Option<ReportType>,
    default_days_back: Option<u32>,
    default_page_size: Option<u32>,
    task_list_limit: Option<usize>,
    kline_days: Option<u32>,
    run_mode: Option<String>,
    proxy: Option<String>,
}

impl DashboardConfigBuilder {
    /// Set the backend base URL
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the preselected report type
    pub fn default_report_type(mut self, report_type: ReportType) -> Self {
        self.default_report_type = Some(report_type);
        self
    }

    /// Set the preselected days-back option
    pub fn default_days_back(mut self, days: u32) -> Self {
        self.default_days_back = Some(days);
        self
    }

    /// Set the preselected page size
    pub fn default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = Some(size);
        self
    }

    /// Set the task monitor fetch limit
    pub fn task_list_limit(mut self, limit: usize) -> Self {
        self.task_list_limit = Some(limit);
        self
    }

    /// Set the K-line history length in days
    pub fn kline_days(mut self, days: u32) -> Self {
        self.kline_days = Some(days);
        self
    }

    /// Set the run mode label
    pub fn run_mode(mut self, mode: impl Into<String>) -> Self {
        self.run_mode = Some(mode.into());
        self
    }

    /// Set an HTTP proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let defaults = DashboardConfig::default();

        let config = DashboardConfig {
            api_base: self.api_base.unwrap_or(defaults.api_base),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            default_report_type: self
                .default_report_type
                .unwrap_or(defaults.default_report_type),
            default_days_back: self.default_days_back.unwrap_or(defaults.default_days_back),
            default_page_size: self.default_page_size.unwrap_or(defaults.default_page_size),
            task_list_limit: self.task_list_limit.unwrap_or(defaults.task_list_limit),
            kline_period: defaults.kline_period,
            kline_days: self.kline_days.unwrap_or(defaults.kline_days),
            run_mode: self.run_mode.unwrap_or(defaults.run_mode),
            proxy: self.proxy,
        };

        config.validate()?;
        Ok(config)
    }
}
