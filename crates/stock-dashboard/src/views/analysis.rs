//! Analysis view: submit one stock for analysis and show the report

use super::{ViewContext, rejected};
use crate::config::DashboardConfig;
use crate::formatter::{format_text, render_report};
use crate::models::ReportType;
use crate::page::{Block, Page, PageStatus};
use crate::request::RequestBuilder;
use crate::router::View;

/// Raw analysis form input
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisForm {
    pub stock_code: String,
    pub report_type: ReportType,
    pub force_refresh: bool,
    pub notify: bool,
}

impl AnalysisForm {
    /// Form with the default options
    pub fn new(stock_code: impl Into<String>) -> Self {
        Self {
            stock_code: stock_code.into(),
            report_type: ReportType::Detailed,
            force_refresh: false,
            notify: true,
        }
    }

    pub fn report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}

#[derive(Debug, Default)]
pub struct AnalysisView;

impl AnalysisView {
    pub fn new() -> Self {
        Self
    }

    /// Empty form page
    pub fn open(&self, config: &DashboardConfig) -> Page {
        let mut page = Page::for_view(View::Analysis);
        page.push(Block::Fields(vec![
            Block::field("股票代码", "例如: 600519, 00700, AAPL"),
            Block::field("报告类型", config.default_report_type.as_str()),
            Block::field("强制刷新", "否"),
            Block::field("发送通知", "是"),
        ]));
        page.push(Block::Caption(
            "支持 A股(600519)、港股(00700)、美股(AAPL)".to_string(),
        ));
        page
    }

    /// Submit the form and render the analysis outcome
    pub async fn submit(&self, ctx: &ViewContext<'_>, form: &AnalysisForm) -> Page {
        let page = Page::for_view(View::Analysis);

        let request = match RequestBuilder::analysis(
            &form.stock_code,
            form.report_type,
            form.force_refresh,
            form.notify,
        ) {
            Ok(request) => request,
            Err(err) => return rejected(page, &err),
        };

        tracing::info!(
            stock_code = %request.stock_code,
            query_id = %request.query_id,
            report_type = %request.report_type,
            "submitting analysis"
        );

        let outcome = ctx
            .call(
                View::Analysis,
                format!("正在分析 {}...", request.stock_code),
                ctx.services.analysis().analyze(&request),
            )
            .await;

        let result = match outcome {
            Ok(Some(result)) => result,
            Ok(None) => {
                return page.no_data("分析未返回结果，请检查股票代码是否正确或查看日志");
            }
            Err(err) => return page.fail(format!("分析过程中发生错误: {err}")),
        };

        let mut page = page.with_status(PageStatus::Success);
        page.push(Block::success("分析完成！"));
        page.push(Block::Divider);
        page.push(Block::heading(format!(
            "📈 {} ({})",
            format_text(result.stock_name.as_deref()),
            format_text(result.stock_code.as_deref()),
        )));
        if let Some(report) = &result.report {
            page.extend(render_report(report));
        }
        page.push(Block::Caption(format!("查询 ID: {}", request.query_id)));
        page
    }
}
