//! Typed collaborator payloads
//!
//! Backend responses are loosely structured; every field a backend may omit is
//! an `Option` here and its absence is rendered, never treated as a failure.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Analysis report flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Full report
    #[default]
    Detailed,
    /// Condensed report
    Simple,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Simple => "simple",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detailed" | "full" | "完整" => Ok(Self::Detailed),
            "simple" | "brief" | "精简" => Ok(Self::Simple),
            other => Err(DashboardError::validation(format!("未知报告类型: {other}"))),
        }
    }
}

/// Result of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub stock_name: Option<String>,
    pub stock_code: Option<String>,
    pub report: Option<Report>,
}

/// An analysis report, either structured or raw markdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    Markdown(String),
    Structured(StructuredReport),
}

/// Structured report; each section is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    pub summary: Option<String>,
    pub operation_advice: Option<String>,
    /// Expected in [0, 100]
    pub sentiment_score: Option<f64>,
    pub trend_prediction: Option<String>,
    #[serde(alias = "full_report_text")]
    pub full_report: Option<String>,
}

/// One page of historical analysis records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

impl HistoryPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(default)]
    pub meta: HistoryMeta,
    pub report: Option<Report>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryMeta {
    pub stock_code: Option<String>,
    pub stock_name: Option<String>,
    pub created_at: Option<String>,
    pub operation_advice: Option<String>,
    pub sentiment_score: Option<f64>,
}

/// Real-time quote snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub current_price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub open: Option<f64>,
    pub prev_close: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
    pub amount: Option<f64>,
    pub turnover_rate: Option<f64>,
}

/// Daily bar history for the quote chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    #[serde(default)]
    pub data: Vec<PricePoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Task status as reported by the task queue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Other("unknown".to_string())
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl From<Option<String>> for TaskStatus {
    fn from(raw: Option<String>) -> Self {
        raw.map(Self::from).unwrap_or_default()
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task known to the task queue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: Option<String>,
    pub stock_code: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

/// System configuration as returned by the config store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub config: Option<BTreeMap<String, serde_json::Value>>,
    pub schema: Option<serde_json::Value>,
}
