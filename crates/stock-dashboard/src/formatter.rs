//! Response formatting
//!
//! Maps collaborator payloads onto display blocks. Classification helpers are
//! plain substring predicates evaluated in a fixed order so tie-breaks stay
//! reproducible.

use crate::models::{Report, StructuredReport, Task, TaskStatus};
use crate::page::{Block, Tone};

/// Token marking buy advice
pub const BUY_SIGNAL: &str = "买入";

/// Token marking sell advice
pub const SELL_SIGNAL: &str = "卖出";

/// Placeholder for missing values
pub const NOT_AVAILABLE: &str = "N/A";

/// Replacement for short or empty secrets
pub const MASK_TOKEN: &str = "***";

const MASK_PREFIX_CHARS: usize = 8;

/// Substrings marking a configuration key as secret
const SENSITIVE_KEY_MARKERS: [&str; 3] = ["api_key", "token", "password"];

/// Configuration keys shown on the config page, by section
pub const CONFIG_SECTIONS: &[(&str, &[&str])] = &[
    (
        "AI 配置",
        &["gemini_api_key", "openai_api_key", "openai_base_url", "openai_model"],
    ),
    (
        "通知配置",
        &["wechat_webhook_url", "feishu_webhook_url", "telegram_bot_token"],
    ),
    ("数据源配置", &["tushare_token", "tavily_api_keys", "serpapi_keys"]),
    ("股票配置", &["stock_list"]),
];

/// Direction of operation advice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    Buy,
    Sell,
    Neutral,
}

impl Advice {
    /// Callout framing for the advice text
    pub fn tone(self) -> Tone {
        match self {
            Self::Buy => Tone::Success,
            Self::Sell => Tone::Error,
            Self::Neutral => Tone::Warning,
        }
    }
}

/// Classify free-text advice. The buy token is checked first, so text
/// containing both tokens is `Buy`.
pub fn classify_advice(text: &str) -> Advice {
    if text.contains(BUY_SIGNAL) {
        Advice::Buy
    } else if text.contains(SELL_SIGNAL) {
        Advice::Sell
    } else {
        Advice::Neutral
    }
}

/// Map a 0-100 sentiment score onto a progress fraction. Out-of-range scores
/// pass through unclamped.
pub fn sentiment_to_fraction(score: f64) -> f64 {
    score / 100.0
}

/// Whether a configuration key holds a secret
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_KEY_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Mask a secret for display: an 8-character prefix plus "..." when the value
/// is longer than 8 characters, `***` otherwise.
pub fn mask_secret(value: Option<&str>) -> String {
    match value {
        Some(v) if v.chars().count() > MASK_PREFIX_CHARS => {
            let prefix: String = v.chars().take(MASK_PREFIX_CHARS).collect();
            format!("{prefix}...")
        }
        _ => MASK_TOKEN.to_string(),
    }
}

/// Display string for one configuration entry, masked when the key is secret
pub fn display_config_value(key: &str, value: &serde_json::Value) -> String {
    let text = match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    };

    if is_sensitive_key(key) {
        mask_secret(text.as_deref())
    } else {
        text.unwrap_or_default()
    }
}

/// Format an optional number, `N/A` when absent
pub fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

/// Format an optional number to two decimals, `N/A` when absent
pub fn format_fixed(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

/// Format optional text, `N/A` when absent
pub fn format_text(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

/// Tasks sharing one status
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGroup {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// Group tasks by status. Groups appear in first-seen order and keep the input
/// order within each group.
pub fn group_tasks(tasks: Vec<Task>) -> Vec<TaskGroup> {
    let mut groups: Vec<TaskGroup> = Vec::new();
    for task in tasks {
        match groups.iter_mut().find(|g| g.status == task.status) {
            Some(group) => group.tasks.push(task),
            None => groups.push(TaskGroup {
                status: task.status.clone(),
                tasks: vec![task],
            }),
        }
    }
    groups
}

/// Badge shown next to a task
pub fn task_badge(status: &TaskStatus) -> Block {
    match status {
        TaskStatus::Running => Block::warning("运行中"),
        TaskStatus::Completed => Block::success("已完成"),
        TaskStatus::Failed => Block::error("失败"),
        other => Block::info(other.as_str()),
    }
}

/// Render a report. Structured reports render each present section; a raw
/// string renders verbatim.
pub fn render_report(report: &Report) -> Vec<Block> {
    match report {
        Report::Markdown(text) => vec![Block::Markdown(text.clone())],
        Report::Structured(report) => render_structured(report),
    }
}

fn render_structured(report: &StructuredReport) -> Vec<Block> {
    let mut blocks = Vec::new();

    if let Some(summary) = &report.summary {
        blocks.push(Block::heading("📋 分析摘要"));
        blocks.push(Block::info(summary));
    }

    if let Some(advice) = &report.operation_advice {
        blocks.push(Block::heading("💡 操作建议"));
        blocks.push(Block::callout(classify_advice(advice).tone(), advice));
    }

    if let Some(score) = report.sentiment_score {
        blocks.push(Block::heading("📊 情绪评分"));
        blocks.push(Block::Progress(sentiment_to_fraction(score)));
        blocks.push(Block::Caption(format!("评分: {score}/100")));
    }

    if let Some(trend) = &report.trend_prediction {
        blocks.push(Block::heading("🔮 趋势预测"));
        blocks.push(Block::info(trend));
    }

    if let Some(full) = &report.full_report {
        blocks.push(Block::heading("📄 完整报告"));
        blocks.push(Block::Markdown(full.clone()));
    }

    blocks
}
