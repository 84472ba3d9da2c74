//! Quote view: real-time quote lookup plus an optional K-line history

use super::{ViewContext, rejected};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::formatter::{format_fixed, format_value};
use crate::models::{PriceHistory, Quote};
use crate::page::{Block, Metric, Page, PageStatus, SeriesPoint};
use crate::request::RequestBuilder;
use crate::router::View;

/// Quote view; remembers the last successfully quoted code
#[derive(Debug, Default)]
pub struct QuoteView {
    last_code: Option<String>,
}

impl QuoteView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty form page
    pub fn open(&self) -> Page {
        let mut page = Page::for_view(View::Quote);
        page.push(Block::Fields(vec![Block::field(
            "股票代码",
            "例如: 600519, 00700, AAPL",
        )]));
        page.push(Block::Caption("支持 A股、港股、美股".to_string()));
        page
    }

    /// Fetch and render a real-time quote
    pub async fn query(&mut self, ctx: &ViewContext<'_>, raw_code: &str) -> Page {
        self.last_code = None;

        let page = Page::for_view(View::Quote);
        let request = match RequestBuilder::quote(raw_code) {
            Ok(request) => request,
            Err(err) => return rejected(page, &err),
        };

        let outcome = ctx
            .call(
                View::Quote,
                format!("正在获取 {} 的行情数据...", request.stock_code),
                ctx.services.quote().realtime(&request.stock_code),
            )
            .await;

        match outcome {
            Ok(Some(quote)) => {
                self.last_code = Some(request.stock_code);
                render_quote(&quote)
            }
            Ok(None) => page.no_data(format!("未获取到 {} 的行情数据", request.stock_code)),
            Err(err) => page.fail(format!("查询失败: {err}")),
        }
    }

    /// Fetch the K-line history for the last quoted code. Failures here are
    /// framed as warnings since the quote itself already succeeded.
    pub async fn show_history(&self, ctx: &ViewContext<'_>, config: &DashboardConfig) -> Page {
        let page = Page::for_view(View::Quote);
        let Some(code) = &self.last_code else {
            return rejected(page, &DashboardError::validation("请先查询行情"));
        };

        let outcome = ctx
            .call(
                View::Quote,
                format!("正在获取 {code} 的历史K线数据..."),
                ctx.services
                    .quote()
                    .history(code, &config.kline_period, config.kline_days),
            )
            .await;

        match outcome {
            Ok(Some(history)) if !history.data.is_empty() => render_history(code, &history),
            Ok(_) => page.no_data(format!("{code} 暂无历史K线数据")),
            Err(err) => {
                let mut page = page.with_status(PageStatus::Warning);
                page.push(Block::warning(format!("获取历史数据失败: {err}")));
                page
            }
        }
    }

    pub fn last_code(&self) -> Option<&str> {
        self.last_code.as_deref()
    }
}

fn render_quote(quote: &Quote) -> Page {
    let mut page = Page::for_view(View::Quote).with_status(PageStatus::Success);
    page.push(Block::success("行情数据获取成功"));

    let change = Metric {
        label: "涨跌".to_string(),
        value: format_fixed(quote.change),
        delta: Some(match quote.change_percent {
            Some(pct) => format!("{pct:.2}%"),
            None => format_value(None),
        }),
    };

    page.push(Block::Metrics(vec![
        Block::metric("当前价", format_value(quote.current_price)),
        change,
        Block::metric("今日开盘", format_value(quote.open)),
        Block::metric("昨日收盘", format_value(quote.prev_close)),
    ]));
    page.push(Block::Divider);
    page.push(Block::Fields(vec![
        Block::field("最高价", format_value(quote.high)),
        Block::field("最低价", format_value(quote.low)),
        Block::field("成交量", format_value(quote.volume)),
        Block::field("成交额", format_value(quote.amount)),
        Block::field("换手率", format_value(quote.turnover_rate)),
    ]));
    page
}

fn render_history(code: &str, history: &PriceHistory) -> Page {
    let points: Vec<SeriesPoint> = history
        .data
        .iter()
        .filter_map(|p| {
            p.close.map(|close| SeriesPoint {
                x: p.date.clone(),
                y: close,
            })
        })
        .collect();

    let mut page = Page::for_view(View::Quote).with_status(PageStatus::Success);
    page.push(Block::heading(format!("{code} 历史K线")));
    page.push(Block::Series {
        label: "close".to_string(),
        points,
    });
    page
}
