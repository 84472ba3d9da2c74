//! Display model produced by every view render
//!
//! A [`Page`] is renderer-agnostic: the host turns it into terminal text,
//! Markdown or JSON. Callers inspect [`PageStatus`] rather than rendered text
//! to tell success, "no data" and failure apart.

use crate::router::View;
use serde::{Deserialize, Serialize};

/// Outcome marker for a rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// Form shown, nothing submitted yet
    Idle,
    /// Collaborator returned data
    Success,
    /// Collaborator succeeded but returned nothing
    NoData,
    /// Partial failure; page still usable
    Warning,
    /// Validation, routing or collaborator failure
    Error,
}

/// Visual framing of a callout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// A labelled headline number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
}

/// A read-only label/value pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

/// One point of a line series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: String,
    pub y: f64,
}

/// Page content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Block {
    Heading(String),
    Markdown(String),
    Callout { tone: Tone, text: String },
    /// Fraction in [0, 1] when the source score is in range
    Progress(f64),
    Caption(String),
    Metrics(Vec<Metric>),
    Fields(Vec<Field>),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Group { title: String, blocks: Vec<Block> },
    Series { label: String, points: Vec<SeriesPoint> },
    Divider,
}

impl Block {
    pub fn callout(tone: Tone, text: impl Into<String>) -> Self {
        Self::Callout {
            tone,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::callout(Tone::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::callout(Tone::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::callout(Tone::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::callout(Tone::Error, text)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::Heading(text.into())
    }

    pub fn metric(label: impl Into<String>, value: impl Into<String>) -> Metric {
        Metric {
            label: label.into(),
            value: value.into(),
            delta: None,
        }
    }

    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Field {
        Field {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Rendered output of one view cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Originating view; `None` for the unknown-view fallback
    pub view: Option<View>,
    pub title: String,
    pub subtitle: Option<String>,
    pub status: PageStatus,
    pub blocks: Vec<Block>,
}

impl Page {
    /// Create an idle page headed with the view's title
    pub fn for_view(view: View) -> Self {
        Self {
            view: Some(view),
            title: view.title().to_string(),
            subtitle: Some(view.subtitle().to_string()),
            status: PageStatus::Idle,
            blocks: Vec::new(),
        }
    }

    /// Fallback page for a navigation label outside the view set
    pub fn unknown_view(label: &str) -> Self {
        Self {
            view: None,
            title: "未知页面".to_string(),
            subtitle: None,
            status: PageStatus::Error,
            blocks: vec![Block::error(format!("未知页面: {label}"))],
        }
    }

    pub fn with_status(mut self, status: PageStatus) -> Self {
        self.status = status;
        self
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.blocks.extend(blocks);
    }

    /// Mark the page failed with a visible message
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.status = PageStatus::Error;
        self.blocks.push(Block::error(message));
        self
    }

    /// Mark the page as a successful empty result
    pub fn no_data(mut self, message: impl Into<String>) -> Self {
        self.status = PageStatus::NoData;
        self.blocks.push(Block::info(message));
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == PageStatus::Error
    }

    pub fn is_no_data(&self) -> bool {
        self.status == PageStatus::NoData
    }

    /// All callouts with the given tone, in page order, including nested ones
    pub fn callouts(&self, tone: Tone) -> Vec<&str> {
        fn walk<'a>(blocks: &'a [Block], tone: Tone, out: &mut Vec<&'a str>) {
            for block in blocks {
                match block {
                    Block::Callout { tone: t, text } if *t == tone => out.push(text),
                    Block::Group { blocks, .. } => walk(blocks, tone, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.blocks, tone, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_creation() {
        let page = Page::for_view(View::Quote);
        assert_eq!(page.status, PageStatus::Idle);
        assert_eq!(page.view, Some(View::Quote));
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_fail_and_no_data_are_distinct() {
        let failed = Page::for_view(View::History).fail("查询失败: timeout");
        let empty = Page::for_view(View::History).no_data("暂无历史记录");

        assert!(failed.is_error());
        assert!(!failed.is_no_data());
        assert!(empty.is_no_data());
        assert!(!empty.is_error());
        assert_eq!(empty.callouts(Tone::Info), vec!["暂无历史记录"]);
    }

    #[test]
    fn test_callouts_walk_groups() {
        let mut page = Page::for_view(View::TaskMonitor);
        page.push(Block::Group {
            title: "failed (1)".to_string(),
            blocks: vec![Block::error("失败")],
        });
        assert_eq!(page.callouts(Tone::Error), vec!["失败"]);
    }

    #[test]
    fn test_page_serializes_with_block_tags() {
        let mut page = Page::for_view(View::Analysis);
        page.push(Block::Progress(0.5));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["status"], "idle");
        assert_eq!(json["blocks"][0]["type"], "progress");
        assert_eq!(json["blocks"][0]["data"], 0.5);
    }
}
