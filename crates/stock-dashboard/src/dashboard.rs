//! Dashboard controller
//!
//! Owns one [`Session`] and the per-view state, and turns navigation and
//! user actions into rendered [`Page`]s. Every render first makes sure the
//! session is initialized; initialization happens at most once.

use crate::busy::BusyIndicator;
use crate::collaborators::ServiceFactory;
use crate::page::Page;
use crate::router::{View, ViewRouter};
use crate::session::{Session, SessionServices};
use crate::views::{
    AnalysisForm, AnalysisView, ConfigView, HistoryForm, HistoryView, QuoteView, TaskMonitorView,
    ViewContext,
};
use serde::Serialize;
use std::sync::Arc;

/// A user interaction on the current view
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Switch view by its navigation label
    Navigate(String),
    SubmitAnalysis(AnalysisForm),
    QueryHistory(HistoryForm),
    /// Open one record of the displayed history page
    SelectHistory(usize),
    QueryQuote(String),
    /// K-line history for the last quoted code
    ShowKline,
    /// Re-render the current view; data views re-fetch
    Refresh,
}

/// Navigation entry shown in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub label: &'static str,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sidebar {
    pub entries: Vec<SidebarEntry>,
    pub run_mode: String,
}

pub struct Dashboard {
    session: Session,
    factory: Arc<dyn ServiceFactory>,
    router: ViewRouter,
    busy: BusyIndicator,
    current: View,
    analysis: AnalysisView,
    history: HistoryView,
    quote: QuoteView,
    task_monitor: TaskMonitorView,
    config_view: ConfigView,
}

impl Dashboard {
    /// Dashboard starting on the analysis view
    pub fn new(factory: Arc<dyn ServiceFactory>) -> Self {
        Self::with_busy(factory, BusyIndicator::new())
    }

    /// Use a busy indicator wired to a host listener
    pub fn with_busy(factory: Arc<dyn ServiceFactory>, busy: BusyIndicator) -> Self {
        Self {
            session: Session::new(),
            factory,
            router: ViewRouter::new(),
            busy,
            current: View::Analysis,
            analysis: AnalysisView::new(),
            history: HistoryView::new(),
            quote: QuoteView::new(),
            task_monitor: TaskMonitorView::new(),
            config_view: ConfigView::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_view(&self) -> View {
        self.current
    }

    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    /// Render the current view as it looks on arrival
    pub async fn render(&mut self) -> Page {
        let view = self.current;
        self.open(view).await
    }

    /// Switch to the view behind `label` and render it. An unknown label
    /// leaves the current view unchanged and renders a fallback page.
    pub async fn navigate(&mut self, label: &str) -> Page {
        match self.router.route(label) {
            Ok(view) => {
                tracing::debug!(view = %view, "navigating");
                self.current = view;
                self.open(view).await
            }
            Err(err) => {
                tracing::warn!(label, "routing fallback: {err}");
                Page::unknown_view(label)
            }
        }
    }

    /// Apply one user action
    pub async fn dispatch(&mut self, action: Action) -> Page {
        let view = match &action {
            Action::Navigate(label) => return self.navigate(label).await,
            Action::Refresh => return self.render().await,
            Action::SubmitAnalysis(_) => View::Analysis,
            Action::QueryHistory(_) | Action::SelectHistory(_) => View::History,
            Action::QueryQuote(_) | Action::ShowKline => View::Quote,
        };
        self.current = view;

        let services = match initialize(&self.session, self.factory.as_ref(), view) {
            Ok(services) => services,
            Err(page) => return page,
        };
        let ctx = ViewContext::new(services, &self.busy);

        match action {
            Action::SubmitAnalysis(form) => self.analysis.submit(&ctx, &form).await,
            Action::QueryHistory(form) => self.history.query(&ctx, &form).await,
            Action::SelectHistory(index) => self.history.select(index),
            Action::QueryQuote(code) => self.quote.query(&ctx, &code).await,
            Action::ShowKline => self.quote.show_history(&ctx, services.config()).await,
            Action::Navigate(_) | Action::Refresh => Page::for_view(view),
        }
    }

    /// Navigation menu state
    pub fn sidebar(&self) -> Sidebar {
        let run_mode = self.session.services().map_or_else(
            |_| self.factory.config().map(|c| c.run_mode).unwrap_or_default(),
            |services| services.config().run_mode.clone(),
        );

        Sidebar {
            entries: View::ALL
                .iter()
                .map(|view| SidebarEntry {
                    label: view.label(),
                    current: *view == self.current,
                })
                .collect(),
            run_mode,
        }
    }

    async fn open(&mut self, view: View) -> Page {
        let services = match initialize(&self.session, self.factory.as_ref(), view) {
            Ok(services) => services,
            Err(page) => return page,
        };
        let ctx = ViewContext::new(services, &self.busy);
        let config = services.config();

        match view {
            View::Analysis => self.analysis.open(config),
            View::History => self.history.open(config),
            View::Quote => self.quote.open(),
            View::TaskMonitor => self.task_monitor.refresh(&ctx).await,
            View::Config => self.config_view.render(&ctx).await,
        }
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("session", &self.session)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Initialize the session if needed; failure becomes an error page for `view`
fn initialize<'a>(
    session: &'a Session,
    factory: &dyn ServiceFactory,
    view: View,
) -> Result<&'a SessionServices, Page> {
    session.initialize(factory).map_err(|err| {
        tracing::error!(session_id = %session.id(), error = ?err, "session initialization failed");
        Page::for_view(view).fail(format!("初始化失败: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{
        MockAnalysisCollaborator, MockHistoryCollaborator, MockSystemConfigCollaborator,
        MockTaskQueueCollaborator,
    };
    use crate::models::{HistoryItem, HistoryPage};
    use crate::error::DashboardError;
    use crate::page::{PageStatus, Tone};
    use crate::session::testing::StubFactory;
    use std::sync::Mutex;

    fn dashboard(factory: StubFactory) -> (Dashboard, Arc<StubFactory>) {
        let factory = Arc::new(factory);
        (Dashboard::new(factory.clone()), factory)
    }

    #[tokio::test]
    async fn test_landing_pages_make_no_calls() {
        let (mut dash, factory) = dashboard(StubFactory::default());

        for label in ["股票分析", "历史记录", "股票行情"] {
            let page = dash.navigate(label).await;
            assert_eq!(page.status, PageStatus::Idle);
        }
        assert_eq!(dash.current_view(), View::Quote);
        assert_eq!(factory.builds(), 4);
    }

    #[tokio::test]
    async fn test_unknown_label_falls_back() {
        let (mut dash, _) = dashboard(StubFactory::default());
        dash.navigate("股票行情").await;

        let page = dash.navigate("回测中心").await;
        assert_eq!(page.view, None);
        assert!(page.is_error());
        assert_eq!(page.callouts(Tone::Error), vec!["未知页面: 回测中心"]);
        assert_eq!(dash.current_view(), View::Quote);
    }

    #[tokio::test]
    async fn test_collaborator_failure_keeps_session() {
        let mut analysis = MockAnalysisCollaborator::new();
        analysis
            .expect_analyze()
            .times(1)
            .returning(|_| Err(DashboardError::collaborator("connection reset")));
        let (mut dash, factory) = dashboard(StubFactory {
            analysis: Mutex::new(Some(analysis)),
            ..Default::default()
        });

        let page = dash
            .dispatch(Action::SubmitAnalysis(AnalysisForm::new("600519")))
            .await;

        assert!(page.is_error());
        assert!(dash.session().is_initialized());
        assert!(!dash.busy().is_busy());

        dash.navigate("历史记录").await;
        assert_eq!(factory.builds(), 4);
    }

    #[tokio::test]
    async fn test_data_views_fetch_on_navigation() {
        let mut queue = MockTaskQueueCollaborator::new();
        queue.expect_list_tasks().times(2).returning(|_| Ok(Vec::new()));
        let mut config = MockSystemConfigCollaborator::new();
        config.expect_get_config().times(1).returning(|_| Ok(None));
        let (mut dash, _) = dashboard(StubFactory {
            task_queue: Mutex::new(Some(queue)),
            system_config: Mutex::new(Some(config)),
            ..Default::default()
        });

        assert!(dash.navigate("任务监控").await.is_no_data());
        assert!(dash.dispatch(Action::Refresh).await.is_no_data());
        assert!(dash.navigate("系统配置").await.is_no_data());
    }

    #[tokio::test]
    async fn test_failed_initialization_renders_error_and_retries() {
        let (mut dash, _) = dashboard(StubFactory {
            fail_config: true,
            ..Default::default()
        });

        let page = dash.navigate("股票分析").await;
        assert!(page.is_error());
        assert!(!dash.session().is_initialized());
    }

    #[tokio::test]
    async fn test_sidebar_tracks_current_view() {
        let (mut dash, _) = dashboard(StubFactory::default());
        dash.navigate("历史记录").await;

        let sidebar = dash.sidebar();
        let current: Vec<_> = sidebar
            .entries
            .iter()
            .filter(|e| e.current)
            .map(|e| e.label)
            .collect();
        assert_eq!(current, vec!["历史记录"]);
        assert_eq!(sidebar.entries.len(), 5);
        assert_eq!(sidebar.run_mode, "Terminal UI");
    }

    #[tokio::test]
    async fn test_select_switches_to_history() {
        let (mut dash, _) = dashboard(StubFactory::default());
        let page = dash.dispatch(Action::SelectHistory(0)).await;
        assert_eq!(dash.current_view(), View::History);
        assert_eq!(page.callouts(Tone::Error), vec!["请先查询历史记录"]);
    }

    #[tokio::test]
    async fn test_history_selection_needs_visible_listing() {
        let mut history = MockHistoryCollaborator::new();
        history.expect_list().times(2).returning(|_| {
            Ok(Some(HistoryPage {
                total: 1,
                items: vec![HistoryItem::default()],
            }))
        });
        let (mut dash, _) = dashboard(StubFactory {
            history: Mutex::new(Some(history)),
            ..Default::default()
        });
        let form = HistoryForm {
            code_filter: String::new(),
            days_back: 30,
            page_size: 20,
        };

        let page = dash.dispatch(Action::QueryHistory(form.clone())).await;
        assert_eq!(page.status, PageStatus::Success);
        dash.navigate("股票行情").await;
        dash.navigate("历史记录").await;
        let page = dash.dispatch(Action::SelectHistory(0)).await;
        assert_eq!(page.callouts(Tone::Error), vec!["请先查询历史记录"]);

        dash.dispatch(Action::QueryHistory(form)).await;
        let page = dash.dispatch(Action::Refresh).await;
        assert_eq!(page.status, PageStatus::Idle);
        let page = dash.dispatch(Action::SelectHistory(0)).await;
        assert_eq!(page.callouts(Tone::Error), vec!["请先查询历史记录"]);
    }
}
