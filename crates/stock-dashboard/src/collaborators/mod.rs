//! Backend collaborator contracts
//!
//! The dashboard never implements analysis, storage, market data or task
//! execution itself. Each backend is reached through one of these traits;
//! `Ok(None)` (or an empty list) means the backend answered with no data.

pub mod http;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::{AnalysisResult, HistoryPage, PriceHistory, Quote, SystemConfig, Task};
use crate::request::{AnalysisRequest, HistoryQuery};
use async_trait::async_trait;
use std::sync::Arc;

pub use http::{HttpBackend, HttpServiceFactory};

/// Runs stock analyses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisCollaborator: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Option<AnalysisResult>>;
}

/// Lists stored analysis reports
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryCollaborator: Send + Sync {
    async fn list(&self, query: &HistoryQuery) -> Result<Option<HistoryPage>>;
}

/// Provides market quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteCollaborator: Send + Sync {
    async fn realtime(&self, stock_code: &str) -> Result<Option<Quote>>;

    async fn history(
        &self,
        stock_code: &str,
        period: &str,
        days: u32,
    ) -> Result<Option<PriceHistory>>;
}

/// Reports task queue state
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskQueueCollaborator: Send + Sync {
    async fn list_tasks(&self, limit: usize) -> Result<Vec<Task>>;
}

/// Reads the system configuration store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SystemConfigCollaborator: Send + Sync {
    async fn get_config(&self, include_schema: bool) -> Result<Option<SystemConfig>>;
}

/// Constructs the collaborator handles for a session.
///
/// Construction may open connections, so a session calls each method at most
/// once.
pub trait ServiceFactory: Send + Sync {
    /// Load the configuration snapshot cached by the session
    fn config(&self) -> Result<DashboardConfig>;

    fn analysis(&self, config: &DashboardConfig) -> Result<Arc<dyn AnalysisCollaborator>>;

    fn history(&self, config: &DashboardConfig) -> Result<Arc<dyn HistoryCollaborator>>;

    fn quote(&self, config: &DashboardConfig) -> Result<Arc<dyn QuoteCollaborator>>;

    fn system_config(
        &self,
        config: &DashboardConfig,
    ) -> Result<Arc<dyn SystemConfigCollaborator>>;

    /// Handle to the task queue, which outlives any single session
    fn task_queue(&self, config: &DashboardConfig) -> Result<Arc<dyn TaskQueueCollaborator>>;
}
