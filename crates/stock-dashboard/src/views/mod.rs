//! Dashboard views
//!
//! Every view follows the same cycle: validate input, make at most one
//! collaborator call under the busy indicator, then format the outcome into a
//! [`Page`]. Failures become error pages; nothing propagates out of a render.

pub mod analysis;
pub mod config;
pub mod history;
pub mod quote;
pub mod task_monitor;

use crate::busy::BusyIndicator;
use crate::error::{DashboardError, Result};
use crate::page::Page;
use crate::router::View;
use crate::session::SessionServices;
use std::future::Future;

pub use analysis::{AnalysisForm, AnalysisView};
pub use config::ConfigView;
pub use history::{HistoryForm, HistoryView};
pub use quote::QuoteView;
pub use task_monitor::TaskMonitorView;

/// What a view needs from its session for one render
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub services: &'a SessionServices,
    pub busy: &'a BusyIndicator,
}

impl<'a> ViewContext<'a> {
    pub fn new(services: &'a SessionServices, busy: &'a BusyIndicator) -> Self {
        Self { services, busy }
    }

    /// Await one collaborator call with the busy indicator raised. Failures
    /// are logged here with full detail and handed back to the view.
    pub async fn call<T, F>(&self, view: View, busy_label: impl Into<String>, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _busy = self.busy.begin(busy_label);
        let result = call.await;
        if let Err(err) = &result {
            tracing::error!(
                view = %view,
                kind = ?err.kind(),
                error = ?err,
                "collaborator call failed: {err}"
            );
        }
        result
    }
}

/// Message shown to the user for a failure
pub(crate) fn user_message(err: &DashboardError) -> String {
    match err {
        DashboardError::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Error page for input rejected before any call was made
pub(crate) fn rejected(page: Page, err: &DashboardError) -> Page {
    tracing::debug!(view = ?page.view, kind = ?err.kind(), "input rejected: {err}");
    page.fail(user_message(err))
}
