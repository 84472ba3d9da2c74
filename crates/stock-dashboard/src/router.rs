//! Navigation routing
//!
//! Maps a navigation selection onto exactly one of the five dashboard views.
//! Only the sidebar labels route; anything else is a routing error.

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five top-level dashboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Trigger an analysis run
    Analysis,
    /// Browse past analysis records
    History,
    /// Real-time quote lookup
    Quote,
    /// Task queue status
    TaskMonitor,
    /// Read-only system configuration
    Config,
}

impl View {
    /// All views in sidebar order
    pub const ALL: [View; 5] = [
        View::Analysis,
        View::History,
        View::Quote,
        View::TaskMonitor,
        View::Config,
    ];

    /// Sidebar label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analysis => "股票分析",
            Self::History => "历史记录",
            Self::Quote => "股票行情",
            Self::TaskMonitor => "任务监控",
            Self::Config => "系统配置",
        }
    }

    /// Page title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Analysis => "📊 股票分析",
            Self::History => "📚 历史记录",
            Self::Quote => "💹 股票行情",
            Self::TaskMonitor => "⚙️ 任务监控",
            Self::Config => "⚙️ 系统配置",
        }
    }

    /// Page subtitle
    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::Analysis => "触发 AI 智能分析，获取股票决策建议",
            Self::History => "查看历史分析记录",
            Self::Quote => "查看实时股票行情数据",
            Self::TaskMonitor => "监控分析任务执行状态",
            Self::Config => "查看和管理系统配置",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Navigation router
#[derive(Debug, Clone, Default)]
pub struct ViewRouter;

impl ViewRouter {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a navigation selection to a view
    pub fn route(&self, selection: &str) -> Result<View> {
        let selection = selection.trim();
        View::ALL
            .iter()
            .find(|v| v.label() == selection)
            .copied()
            .ok_or_else(|| DashboardError::Routing(selection.to_string()))
    }

    /// Sidebar labels in display order
    pub fn labels(&self) -> Vec<&'static str> {
        View::ALL.iter().map(View::label).collect()
    }
}
