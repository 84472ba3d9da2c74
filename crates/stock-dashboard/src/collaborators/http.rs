//! REST collaborators backed by the analysis service HTTP API

use super::{
    AnalysisCollaborator, HistoryCollaborator, QuoteCollaborator, ServiceFactory,
    SystemConfigCollaborator, TaskQueueCollaborator,
};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::models::{AnalysisResult, HistoryPage, PriceHistory, Quote, SystemConfig, Task};
use crate::request::{AnalysisRequest, HistoryQuery};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Body of an analysis submission
#[derive(Debug, Serialize)]
struct AnalyzeBody<'a> {
    stock_code: &'a str,
    report_type: &'a str,
    force_refresh: bool,
    query_id: &'a str,
    send_notification: bool,
    async_mode: bool,
}

/// Task listings arrive either bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskListing {
    Bare(Vec<Task>),
    Wrapped { tasks: Vec<Task> },
}

impl From<TaskListing> for Vec<Task> {
    fn from(listing: TaskListing) -> Self {
        match listing {
            TaskListing::Bare(tasks) | TaskListing::Wrapped { tasks } => tasks,
        }
    }
}

/// HTTP client for the backend REST API
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// Create a client from the dashboard configuration
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        // Proxying is opt-in through the config only
        let mut builder = Client::builder().timeout(config.request_timeout);
        builder = match &config.proxy {
            Some(proxy) => builder.proxy(reqwest::Proxy::all(proxy)?),
            None => builder.no_proxy(),
        };

        let base = Url::parse(&config.api_base)
            .map_err(|e| DashboardError::Config(format!("invalid api_base: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "api_base cannot carry a path: {}",
                config.api_base
            )));
        }

        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    /// Backend URL for the given path segments below `/api/v1`
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| DashboardError::Config("api_base cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    async fn get_optional<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).query(query).send().await?;
        decode_optional(response).await
    }
}

async fn decode_optional<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DashboardError::collaborator(error_message(status, &body)));
    }

    let value: Option<T> = response.json().await?;
    Ok(value)
}

/// Short failure message, preferring the backend's own `detail`/`message`
fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|d| d.as_str().map(str::to_string)))
        });

    match detail {
        Some(detail) => format!("HTTP {status}: {detail}"),
        None if body.trim().is_empty() => format!("HTTP {status}"),
        None => format!("HTTP {status}: {}", body.trim()),
    }
}

#[async_trait]
impl AnalysisCollaborator for HttpBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Option<AnalysisResult>> {
        let url = self.endpoint(&["analysis", "analyze"])?;
        let body = AnalyzeBody {
            stock_code: &request.stock_code,
            report_type: request.report_type.as_str(),
            force_refresh: request.force_refresh,
            query_id: &request.query_id,
            send_notification: request.notify,
            async_mode: false,
        };

        tracing::debug!(%url, query_id = %request.query_id, "POST");
        let response = self.client.post(url).json(&body).send().await?;
        decode_optional(response).await
    }
}

#[async_trait]
impl HistoryCollaborator for HttpBackend {
    async fn list(&self, query: &HistoryQuery) -> Result<Option<HistoryPage>> {
        let url = self.endpoint(&["history"])?;
        let mut params = vec![
            ("start_date", query.start_day().format("%Y-%m-%d").to_string()),
            ("page", query.page.to_string()),
            ("limit", query.page_size.to_string()),
        ];
        if let Some(code) = &query.stock_code_filter {
            params.push(("stock_code", code.clone()));
        }
        self.get_optional(url, &params).await
    }
}

#[async_trait]
impl QuoteCollaborator for HttpBackend {
    async fn realtime(&self, stock_code: &str) -> Result<Option<Quote>> {
        let url = self.endpoint(&["stocks", stock_code, "quote"])?;
        self.get_optional(url, &[]).await
    }

    async fn history(
        &self,
        stock_code: &str,
        period: &str,
        days: u32,
    ) -> Result<Option<PriceHistory>> {
        let url = self.endpoint(&["stocks", stock_code, "history"])?;
        let params = [("period", period.to_string()), ("days", days.to_string())];
        self.get_optional(url, &params).await
    }
}

#[async_trait]
impl TaskQueueCollaborator for HttpBackend {
    async fn list_tasks(&self, limit: usize) -> Result<Vec<Task>> {
        let url = self.endpoint(&["analysis", "tasks"])?;
        let listing: Option<TaskListing> =
            self.get_optional(url, &[("limit", limit.to_string())]).await?;
        Ok(listing.map(Vec::from).unwrap_or_default())
    }
}

#[async_trait]
impl SystemConfigCollaborator for HttpBackend {
    async fn get_config(&self, include_schema: bool) -> Result<Option<SystemConfig>> {
        let url = self.endpoint(&["system", "config"])?;
        self.get_optional(url, &[("include_schema", include_schema.to_string())])
            .await
    }
}

/// Builds HTTP collaborators for each new session.
///
/// Every session gets its own clients; the task queue client is created once
/// and shared, matching the single queue behind the API.
#[derive(Debug)]
pub struct HttpServiceFactory {
    config: DashboardConfig,
    task_queue: OnceCell<Arc<HttpBackend>>,
}

impl HttpServiceFactory {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            task_queue: OnceCell::new(),
        }
    }
}

impl ServiceFactory for HttpServiceFactory {
    fn config(&self) -> Result<DashboardConfig> {
        Ok(self.config.clone())
    }

    fn analysis(&self, config: &DashboardConfig) -> Result<Arc<dyn AnalysisCollaborator>> {
        Ok(Arc::new(HttpBackend::new(config)?))
    }

    fn history(&self, config: &DashboardConfig) -> Result<Arc<dyn HistoryCollaborator>> {
        Ok(Arc::new(HttpBackend::new(config)?))
    }

    fn quote(&self, config: &DashboardConfig) -> Result<Arc<dyn QuoteCollaborator>> {
        Ok(Arc::new(HttpBackend::new(config)?))
    }

    fn system_config(
        &self,
        config: &DashboardConfig,
    ) -> Result<Arc<dyn SystemConfigCollaborator>> {
        Ok(Arc::new(HttpBackend::new(config)?))
    }

    fn task_queue(&self, config: &DashboardConfig) -> Result<Arc<dyn TaskQueueCollaborator>> {
        let backend = self
            .task_queue
            .get_or_try_init(|| HttpBackend::new(config).map(Arc::new))?;
        Ok(backend.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::TaskStatus;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer exactly one request with a canned response; returns the base URL
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    fn backend(base: &str) -> HttpBackend {
        let config = DashboardConfig::builder().api_base(base).build().unwrap();
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_building() {
        let api = backend("http://127.0.0.1:8000");
        assert_eq!(
            api.endpoint(&["analysis", "tasks"]).unwrap().as_str(),
            "http://127.0.0.1:8000/api/v1/analysis/tasks"
        );

        let prefixed = backend("http://gateway/dsa/");
        assert_eq!(
            prefixed.endpoint(&["history"]).unwrap().as_str(),
            "http://gateway/dsa/api/v1/history"
        );
    }

    #[test]
    fn test_endpoint_encodes_codes() {
        let api = backend("http://127.0.0.1:8000");
        assert_eq!(
            api.endpoint(&["stocks", "BRK/B", "quote"]).unwrap().as_str(),
            "http://127.0.0.1:8000/api/v1/stocks/BRK%2FB/quote"
        );
    }

    #[test]
    fn test_task_listing_shapes() {
        let bare: TaskListing =
            serde_json::from_str(r#"[{"stock_code":"600519","status":"pending"}]"#).unwrap();
        assert_eq!(Vec::<Task>::from(bare).len(), 1);

        let wrapped: TaskListing =
            serde_json::from_str(r#"{"tasks":[{"stock_code":"AAPL","status":"running"}]}"#)
                .unwrap();
        assert_eq!(Vec::<Task>::from(wrapped)[0].stock_code.as_deref(), Some("AAPL"));
    }

    #[test]
    fn test_error_message_prefers_detail() {
        let msg = error_message(StatusCode::BAD_REQUEST, r#"{"detail":"无效的股票代码"}"#);
        assert_eq!(msg, "HTTP 400 Bad Request: 无效的股票代码");

        let msg = error_message(StatusCode::BAD_GATEWAY, "");
        assert_eq!(msg, "HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_factory_shares_task_queue() {
        let config = DashboardConfig::default();
        let factory = HttpServiceFactory::new(config.clone());
        let a = factory.task_queue(&config).unwrap();
        let b = factory.task_queue(&config).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_not_found_is_no_data() {
        let api = backend(&serve_once("404 Not Found", "").await);
        let quote = api.realtime("600519").await.unwrap();
        assert!(quote.is_none());
    }

    #[tokio::test]
    async fn test_null_body_is_no_data() {
        let api = backend(&serve_once("200 OK", "null").await);
        let config = api.get_config(true).await.unwrap();
        assert!(config.is_none());
    }

    #[tokio::test]
    async fn test_server_error_carries_detail() {
        let api = backend(&serve_once("500 Internal Server Error", r#"{"detail":"配置存储不可用"}"#).await);
        let err = api.get_config(true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Collaborator);
        assert!(matches!(
            &err,
            DashboardError::Collaborator(msg) if msg == "HTTP 500 Internal Server Error: 配置存储不可用"
        ));
    }

    #[tokio::test]
    async fn test_task_listing_over_http() {
        let api = backend(
            &serve_once(
                "200 OK",
                r#"{"tasks":[{"stock_code":"600519","status":null},{"stock_code":"AAPL","status":"running"}]}"#,
            )
            .await,
        );
        let tasks = api.list_tasks(50).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, TaskStatus::Other("unknown".to_string()));
        assert_eq!(tasks[1].status, TaskStatus::Running);
    }
}
