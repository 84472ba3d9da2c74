//! History view: browse one page of past analyses and open a report inline

use super::{ViewContext, rejected};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::formatter::{format_text, format_value, render_report};
use crate::models::{HistoryItem, HistoryPage};
use crate::page::{Block, Page, PageStatus};
use crate::request::{DAYS_BACK_OPTIONS, PAGE_SIZE_OPTIONS, RequestBuilder};
use crate::router::View;

const TABLE_HEADERS: [&str; 5] = ["股票代码", "股票名称", "分析时间", "操作建议", "情绪评分"];

/// Raw history form input
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryForm {
    pub code_filter: String,
    pub days_back: u32,
    pub page_size: u32,
}

impl HistoryForm {
    /// Form preset from the session configuration
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            code_filter: String::new(),
            days_back: config.default_days_back,
            page_size: config.default_page_size,
        }
    }
}

/// History view; remembers the displayed page and the selected record
#[derive(Debug, Default)]
pub struct HistoryView {
    displayed: Option<HistoryPage>,
    selected: Option<usize>,
}

impl HistoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty form page. Any earlier listing is dropped with it.
    pub fn open(&mut self, config: &DashboardConfig) -> Page {
        self.displayed = None;
        self.selected = None;

        let mut page = Page::for_view(View::History);
        page.push(Block::Fields(vec![
            Block::field("股票代码筛选", "留空显示全部"),
            Block::field("时间范围", format!("{} 天", config.default_days_back)),
            Block::field("每页数量", config.default_page_size.to_string()),
        ]));
        page.push(Block::Caption(format!(
            "时间范围可选 {DAYS_BACK_OPTIONS:?} 天，每页数量可选 {PAGE_SIZE_OPTIONS:?}"
        )));
        page
    }

    /// Run a new query. The previous page and selection are discarded first.
    pub async fn query(&mut self, ctx: &ViewContext<'_>, form: &HistoryForm) -> Page {
        self.displayed = None;
        self.selected = None;

        let page = Page::for_view(View::History);
        let query = match RequestBuilder::history(&form.code_filter, form.days_back, form.page_size)
        {
            Ok(query) => query,
            Err(err) => return rejected(page, &err),
        };

        tracing::info!(
            filter = ?query.stock_code_filter,
            start_date = %query.start_day(),
            page_size = query.page_size,
            "querying history"
        );

        let outcome = ctx
            .call(
                View::History,
                "正在加载历史记录...",
                ctx.services.history().list(&query),
            )
            .await;

        match outcome {
            Ok(Some(result)) if !result.is_empty() => {
                let rendered = render_listing(&result, None);
                self.displayed = Some(result);
                rendered
            }
            Ok(_) => page.no_data("暂无历史记录"),
            Err(err) => page.fail(format!("查询失败: {err}")),
        }
    }

    /// Show the full report of one record on the displayed page
    pub fn select(&mut self, index: usize) -> Page {
        let Some(displayed) = &self.displayed else {
            let err = DashboardError::validation("请先查询历史记录");
            return rejected(Page::for_view(View::History), &err);
        };

        if index >= displayed.items.len() {
            let err = DashboardError::validation(format!(
                "记录序号超出范围: {index} (共 {} 条)",
                displayed.items.len()
            ));
            return rejected(render_listing(displayed, self.selected), &err);
        }

        self.selected = Some(index);
        render_listing(displayed, self.selected)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn displayed(&self) -> Option<&HistoryPage> {
        self.displayed.as_ref()
    }
}

fn render_listing(result: &HistoryPage, selected: Option<usize>) -> Page {
    let mut page = Page::for_view(View::History).with_status(PageStatus::Success);
    page.push(Block::success(format!("找到 {} 条记录", result.total)));

    page.push(Block::Table {
        headers: TABLE_HEADERS.iter().map(ToString::to_string).collect(),
        rows: result.items.iter().map(table_row).collect(),
    });

    page.push(Block::Divider);
    page.push(Block::heading("📄 查看详细报告"));
    page.push(Block::Fields(
        result
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| Block::field(format!("#{i}"), item_label(item)))
            .collect(),
    ));

    if let Some(item) = selected.and_then(|i| result.items.get(i)) {
        page.push(Block::heading(item_label(item)));
        match &item.report {
            Some(report) => page.extend(render_report(report)),
            None => page.push(Block::info("该记录没有报告内容")),
        }
    }

    page
}

fn table_row(item: &HistoryItem) -> Vec<String> {
    let meta = &item.meta;
    vec![
        format_text(meta.stock_code.as_deref()),
        format_text(meta.stock_name.as_deref()),
        format_text(meta.created_at.as_deref()),
        format_text(meta.operation_advice.as_deref()),
        format_value(meta.sentiment_score),
    ]
}

fn item_label(item: &HistoryItem) -> String {
    format!(
        "{} - {}",
        format_text(item.meta.stock_name.as_deref()),
        format_text(item.meta.created_at.as_deref())
    )
}
