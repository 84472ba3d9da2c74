//! Request construction and input validation
//!
//! Builders turn raw form input into typed collaborator requests. They do no
//! I/O; the only non-determinism is the query id minted per analysis
//! submission.

use crate::error::{DashboardError, Result};
use crate::models::ReportType;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Days-back choices offered by the history form
pub const DAYS_BACK_OPTIONS: [u32; 5] = [7, 30, 90, 180, 365];

/// Page-size choices offered by the history form
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Request for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub stock_code: String,
    pub report_type: ReportType,
    pub force_refresh: bool,
    /// Fresh for every submission, never reused
    pub query_id: String,
    pub notify: bool,
}

/// Request for one page of history records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub stock_code_filter: Option<String>,
    /// Clock reading the query was built from
    pub issued_at: DateTime<Utc>,
    /// `issued_at` minus the selected number of days
    pub start_date: DateTime<Utc>,
    pub page: u32,
    pub page_size: u32,
}

impl HistoryQuery {
    /// Calendar date sent to the history store
    pub fn start_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }
}

/// Request for a real-time quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub stock_code: String,
}

/// Builds validated requests from raw form input
pub struct RequestBuilder;

impl RequestBuilder {
    /// Build an analysis request.
    ///
    /// Only emptiness is checked; ticker syntax is left to the analysis
    /// backend.
    pub fn analysis(
        raw_code: &str,
        report_type: ReportType,
        force_refresh: bool,
        notify: bool,
    ) -> Result<AnalysisRequest> {
        let stock_code = required_code(raw_code)?;
        Ok(AnalysisRequest {
            stock_code,
            report_type,
            force_refresh,
            query_id: new_query_id(),
            notify,
        })
    }

    /// Build the first-page history query relative to the current time
    pub fn history(raw_code_filter: &str, days_back: u32, page_size: u32) -> Result<HistoryQuery> {
        Self::history_at(raw_code_filter, days_back, page_size, Utc::now())
    }

    /// Build the first-page history query relative to `now`
    pub fn history_at(
        raw_code_filter: &str,
        days_back: u32,
        page_size: u32,
        now: DateTime<Utc>,
    ) -> Result<HistoryQuery> {
        if !DAYS_BACK_OPTIONS.contains(&days_back) {
            return Err(DashboardError::validation(format!(
                "时间范围必须是 {DAYS_BACK_OPTIONS:?} 之一"
            )));
        }
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return Err(DashboardError::validation(format!(
                "每页数量必须是 {PAGE_SIZE_OPTIONS:?} 之一"
            )));
        }

        let filter = raw_code_filter.trim();
        Ok(HistoryQuery {
            stock_code_filter: (!filter.is_empty()).then(|| filter.to_string()),
            issued_at: now,
            start_date: now - Duration::days(i64::from(days_back)),
            page: 1,
            page_size,
        })
    }

    /// Build a quote request
    pub fn quote(raw_code: &str) -> Result<QuoteRequest> {
        Ok(QuoteRequest {
            stock_code: required_code(raw_code)?,
        })
    }
}

fn required_code(raw: &str) -> Result<String> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(DashboardError::validation("请输入股票代码"));
    }
    Ok(code.to_string())
}

fn new_query_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
