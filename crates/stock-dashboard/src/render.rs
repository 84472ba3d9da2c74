//! Page renderers for host surfaces

use crate::dashboard::Sidebar;
use crate::page::{Block, Page, PageStatus, Tone};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::fmt::Write;
use std::str::FromStr;

const PROGRESS_WIDTH: usize = 20;

/// Output surface a page is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" | "text" => Ok(Self::Terminal),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

pub trait Renderer: Send + Sync {
    fn format(&self) -> OutputFormat;
    fn render_page(&self, page: &Page) -> String;
    /// Navigation menu with the current view marked
    fn render_sidebar(&self, sidebar: &Sidebar) -> String;
}

pub struct TerminalRenderer;

impl TerminalRenderer {
    fn render_blocks(&self, blocks: &[Block], indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        for block in blocks {
            match block {
                Block::Heading(text) => {
                    let _ = writeln!(out, "\n{pad}{text}");
                }
                Block::Markdown(text) => {
                    for line in text.lines() {
                        let _ = writeln!(out, "{pad}{line}");
                    }
                }
                Block::Callout { tone, text } => {
                    let _ = writeln!(out, "{pad}{} {text}", tone_marker(*tone));
                }
                Block::Progress(fraction) => {
                    let _ = writeln!(out, "{pad}{}", progress_bar(*fraction));
                }
                Block::Caption(text) => {
                    let _ = writeln!(out, "{pad}({text})");
                }
                Block::Metrics(metrics) => {
                    let mut table = new_table();
                    table.set_header(metrics.iter().map(|m| m.label.clone()).collect::<Vec<_>>());
                    table.add_row(
                        metrics
                            .iter()
                            .map(|m| match &m.delta {
                                Some(delta) => format!("{}\n{delta}", m.value),
                                None => m.value.clone(),
                            })
                            .collect::<Vec<_>>(),
                    );
                    push_table(out, &pad, &table);
                }
                Block::Fields(fields) => {
                    for field in fields {
                        let _ = writeln!(out, "{pad}{}: {}", field.label, field.value);
                    }
                }
                Block::Table { headers, rows } => {
                    let mut table = new_table();
                    table.set_header(headers.clone());
                    for row in rows {
                        table.add_row(row.clone());
                    }
                    push_table(out, &pad, &table);
                }
                Block::Group { title, blocks } => {
                    let _ = writeln!(out, "{pad}▸ {title}");
                    self.render_blocks(blocks, indent + 1, out);
                }
                Block::Series { label, points } => {
                    let mut table = new_table();
                    table.set_header(vec!["date".to_string(), label.clone()]);
                    for point in points {
                        table.add_row(vec![point.x.clone(), point.y.to_string()]);
                    }
                    push_table(out, &pad, &table);
                }
                Block::Divider => {
                    let _ = writeln!(out, "{pad}{}", "─".repeat(40));
                }
            }
        }
    }
}

impl Renderer for TerminalRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Terminal
    }

    fn render_page(&self, page: &Page) -> String {
        let mut out = format!("== {} ==\n", page.title);
        if let Some(subtitle) = &page.subtitle {
            let _ = writeln!(out, "{subtitle}");
        }
        self.render_blocks(&page.blocks, 0, &mut out);
        out
    }

    fn render_sidebar(&self, sidebar: &Sidebar) -> String {
        let mut out = String::from("📈 股票智能分析系统\n");
        for entry in &sidebar.entries {
            let marker = if entry.current { "●" } else { "○" };
            let _ = writeln!(out, " {marker} {}", entry.label);
        }
        let _ = writeln!(out, "运行模式: {}", sidebar.run_mode);
        out
    }
}

pub struct MarkdownRenderer;

impl MarkdownRenderer {
    fn render_blocks(&self, blocks: &[Block], depth: usize, out: &mut String) {
        for block in blocks {
            match block {
                Block::Heading(text) => {
                    let _ = writeln!(out, "{} {text}\n", "#".repeat(depth + 3));
                }
                Block::Markdown(text) => {
                    let _ = writeln!(out, "{text}\n");
                }
                Block::Callout { tone, text } => {
                    let _ = writeln!(out, "> {} {text}\n", tone_marker(*tone));
                }
                Block::Progress(fraction) => {
                    let _ = writeln!(out, "`{}`\n", progress_bar(*fraction));
                }
                Block::Caption(text) => {
                    let _ = writeln!(out, "*{text}*\n");
                }
                Block::Metrics(metrics) => {
                    for metric in metrics {
                        let delta = metric
                            .delta
                            .as_deref()
                            .map(|d| format!(" ({d})"))
                            .unwrap_or_default();
                        let _ = writeln!(out, "- **{}**: {}{delta}", metric.label, metric.value);
                    }
                    out.push('\n');
                }
                Block::Fields(fields) => {
                    for field in fields {
                        let _ = writeln!(out, "- **{}**: {}", field.label, field.value);
                    }
                    out.push('\n');
                }
                Block::Table { headers, rows } => {
                    push_markdown_table(out, headers, rows);
                }
                Block::Group { title, blocks } => {
                    let _ = writeln!(out, "{} {title}\n", "#".repeat(depth + 3));
                    self.render_blocks(blocks, depth + 1, out);
                }
                Block::Series { label, points } => {
                    let rows: Vec<Vec<String>> = points
                        .iter()
                        .map(|p| vec![p.x.clone(), p.y.to_string()])
                        .collect();
                    push_markdown_table(out, &["date".to_string(), label.clone()], &rows);
                }
                Block::Divider => out.push_str("---\n\n"),
            }
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn render_page(&self, page: &Page) -> String {
        let mut out = format!("## {}\n\n", page.title);
        if let Some(subtitle) = &page.subtitle {
            let _ = writeln!(out, "{subtitle}\n");
        }
        self.render_blocks(&page.blocks, 0, &mut out);
        out
    }

    fn render_sidebar(&self, sidebar: &Sidebar) -> String {
        let mut out = String::from("### 📈 股票智能分析系统\n\n");
        for entry in &sidebar.entries {
            if entry.current {
                let _ = writeln!(out, "- **{}**", entry.label);
            } else {
                let _ = writeln!(out, "- {}", entry.label);
            }
        }
        let _ = writeln!(out, "\n*运行模式: {}*", sidebar.run_mode);
        out
    }
}

/// Serializes the page model as-is
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn render_page(&self, page: &Page) -> String {
        serde_json::to_string_pretty(page).unwrap_or_else(|err| {
            tracing::error!("failed to serialize page: {err}");
            format!(r#"{{"status":"{}"}}"#, status_name(page.status))
        })
    }

    fn render_sidebar(&self, sidebar: &Sidebar) -> String {
        serde_json::to_string(sidebar).unwrap_or_else(|err| {
            tracing::error!("failed to serialize sidebar: {err}");
            String::from("{}")
        })
    }
}

pub struct RendererFactory;

impl RendererFactory {
    pub fn create(format: OutputFormat) -> Box<dyn Renderer> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalRenderer),
            OutputFormat::Markdown => Box::new(MarkdownRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Info => "ℹ️",
        Tone::Success => "✅",
        Tone::Warning => "⚠️",
        Tone::Error => "❌",
    }
}

fn status_name(status: PageStatus) -> &'static str {
    match status {
        PageStatus::Idle => "idle",
        PageStatus::Success => "success",
        PageStatus::NoData => "no_data",
        PageStatus::Warning => "warning",
        PageStatus::Error => "error",
    }
}

fn progress_bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:.0}%",
        "█".repeat(filled),
        "░".repeat(PROGRESS_WIDTH - filled),
        fraction * 100.0
    )
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn push_table(out: &mut String, pad: &str, table: &Table) {
    for line in table.to_string().lines() {
        let _ = writeln!(out, "{pad}{line}");
    }
}

fn push_markdown_table(out: &mut String, headers: &[String], rows: &[Vec<String>]) {
    let escape = |cell: &String| cell.replace('|', "\\|");
    let _ = writeln!(
        out,
        "| {} |",
        headers.iter().map(escape).collect::<Vec<_>>().join(" | ")
    );
    let _ = writeln!(out, "|{}", " --- |".repeat(headers.len()));
    for row in rows {
        let _ = writeln!(
            out,
            "| {} |",
            row.iter().map(escape).collect::<Vec<_>>().join(" | ")
        );
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::SidebarEntry;
    use crate::router::View;

    fn sidebar(current: Option<View>) -> Sidebar {
        Sidebar {
            entries: View::ALL
                .iter()
                .map(|view| SidebarEntry {
                    label: view.label(),
                    current: Some(*view) == current,
                })
                .collect(),
            run_mode: "Terminal UI".to_string(),
        }
    }

    fn sample_page() -> Page {
        let mut page = Page::for_view(View::History).with_status(PageStatus::Success);
        page.push(Block::success("找到 1 条记录"));
        page.push(Block::Table {
            headers: vec!["股票代码".to_string(), "操作建议".to_string()],
            rows: vec![vec!["600519".to_string(), "买入|加仓".to_string()]],
        });
        page.push(Block::Progress(0.75));
        page
    }

    #[test]
    fn test_factory_picks_renderer() {
        for format in [OutputFormat::Terminal, OutputFormat::Markdown, OutputFormat::Json] {
            assert_eq!(RendererFactory::create(format).format(), format);
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Terminal);
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_terminal_renders_table_cells() {
        let out = TerminalRenderer.render_page(&sample_page());
        assert!(out.starts_with("== 📚 历史记录 =="));
        assert!(out.contains("600519"));
        assert!(out.contains("✅ 找到 1 条记录"));
        assert!(out.contains("75%"));
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let out = MarkdownRenderer.render_page(&sample_page());
        assert!(out.contains("| 600519 | 买入\\|加仓 |"));
        assert!(out.contains("> ✅ 找到 1 条记录"));
    }

    #[test]
    fn test_json_round_trips_page() {
        let page = sample_page();
        let out = JsonRenderer.render_page(&page);
        let back: Page = serde_json::from_str(&out).unwrap();
        assert_eq!(back, page);
    }

    #[test]
    fn test_sidebar_marks_current_view() {
        let out = TerminalRenderer.render_sidebar(&sidebar(Some(View::Quote)));
        assert!(out.contains("● 股票行情"));
        assert!(out.contains("○ 股票分析"));
        assert!(out.contains("运行模式: Terminal UI"));

        let md = MarkdownRenderer.render_sidebar(&sidebar(None));
        assert!(!md.contains("**股票"));

        let json: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render_sidebar(&sidebar(Some(View::Config)))).unwrap();
        assert_eq!(json["entries"][4]["current"], true);
        assert_eq!(json["run_mode"], "Terminal UI");
    }

    #[test]
    fn test_progress_bar_clamps_out_of_range() {
        assert!(progress_bar(1.2).starts_with(&format!("[{}]", "█".repeat(PROGRESS_WIDTH))));
        assert!(progress_bar(-0.1).ends_with("-10%"));
    }
}
