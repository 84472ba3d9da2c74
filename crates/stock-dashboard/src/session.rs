//! Per-session state
//!
//! A [`Session`] holds the collaborator handles and configuration snapshot for
//! one user. Handles are built at most once, on the first successful
//! [`Session::initialize`], and are read-only afterwards.

use crate::collaborators::{
    AnalysisCollaborator, HistoryCollaborator, QuoteCollaborator, ServiceFactory,
    SystemConfigCollaborator, TaskQueueCollaborator,
};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Collaborator handles shared by all views of a session
#[derive(Clone)]
pub struct SessionServices {
    config: DashboardConfig,
    analysis: Arc<dyn AnalysisCollaborator>,
    history: Arc<dyn HistoryCollaborator>,
    quote: Arc<dyn QuoteCollaborator>,
    system_config: Arc<dyn SystemConfigCollaborator>,
    task_queue: Arc<dyn TaskQueueCollaborator>,
}

impl SessionServices {
    fn build(factory: &dyn ServiceFactory) -> Result<Self> {
        let config = factory.config()?;
        Ok(Self {
            analysis: factory.analysis(&config)?,
            history: factory.history(&config)?,
            quote: factory.quote(&config)?,
            system_config: factory.system_config(&config)?,
            task_queue: factory.task_queue(&config)?,
            config,
        })
    }

    /// Configuration snapshot taken at initialization
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn analysis(&self) -> &dyn AnalysisCollaborator {
        self.analysis.as_ref()
    }

    pub fn history(&self) -> &dyn HistoryCollaborator {
        self.history.as_ref()
    }

    pub fn quote(&self) -> &dyn QuoteCollaborator {
        self.quote.as_ref()
    }

    pub fn system_config(&self) -> &dyn SystemConfigCollaborator {
        self.system_config.as_ref()
    }

    pub fn task_queue(&self) -> &dyn TaskQueueCollaborator {
        self.task_queue.as_ref()
    }
}

impl std::fmt::Debug for SessionServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionServices")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State owned by one user session
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    services: OnceCell<SessionServices>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            services: OnceCell::new(),
        }
    }

    /// Build the session's services unless already built.
    ///
    /// Repeated calls return the existing services without touching the
    /// factory. A failed build leaves the session uninitialized so a later
    /// call can retry.
    pub fn initialize(&self, factory: &dyn ServiceFactory) -> Result<&SessionServices> {
        self.services.get_or_try_init(|| {
            let services = SessionServices::build(factory)?;
            tracing::info!(session_id = %self.id, "session initialized");
            Ok(services)
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.services.get().is_some()
    }

    /// Services, if the session has been initialized
    pub fn services(&self) -> Result<&SessionServices> {
        self.services
            .get()
            .ok_or_else(|| DashboardError::Other("session not initialized".to_string()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Factory handing out prepared collaborators, counting constructions

    use super::*;
    use crate::collaborators::{
        MockAnalysisCollaborator, MockHistoryCollaborator, MockQuoteCollaborator,
        MockSystemConfigCollaborator, MockTaskQueueCollaborator,
    };
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    pub struct StubFactory {
        pub builds: AtomicUsize,
        pub fail_config: bool,
        pub analysis: Mutex<Option<MockAnalysisCollaborator>>,
        pub history: Mutex<Option<MockHistoryCollaborator>>,
        pub quote: Mutex<Option<MockQuoteCollaborator>>,
        pub system_config: Mutex<Option<MockSystemConfigCollaborator>>,
        pub task_queue: Mutex<Option<MockTaskQueueCollaborator>>,
    }

    fn take<T: Default>(slot: &Mutex<Option<T>>) -> T {
        slot.lock().unwrap().take().unwrap_or_default()
    }

    impl StubFactory {
        pub fn builds(&self) -> usize {
            self.builds.load(Ordering::SeqCst)
        }
    }

    impl ServiceFactory for StubFactory {
        fn config(&self) -> Result<DashboardConfig> {
            if self.fail_config {
                return Err(DashboardError::Config("backend unreachable".to_string()));
            }
            Ok(DashboardConfig::default())
        }

        fn analysis(&self, _config: &DashboardConfig) -> Result<Arc<dyn AnalysisCollaborator>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(take(&self.analysis)))
        }

        fn history(&self, _config: &DashboardConfig) -> Result<Arc<dyn HistoryCollaborator>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(take(&self.history)))
        }

        fn quote(&self, _config: &DashboardConfig) -> Result<Arc<dyn QuoteCollaborator>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(take(&self.quote)))
        }

        fn system_config(
            &self,
            _config: &DashboardConfig,
        ) -> Result<Arc<dyn SystemConfigCollaborator>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(take(&self.system_config)))
        }

        fn task_queue(
            &self,
            _config: &DashboardConfig,
        ) -> Result<Arc<dyn TaskQueueCollaborator>> {
            Ok(Arc::new(take(&self.task_queue)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubFactory;
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let factory = StubFactory::default();
        let session = Session::new();
        assert!(!session.is_initialized());

        session.initialize(&factory).unwrap();
        session.initialize(&factory).unwrap();

        assert!(session.is_initialized());
        assert_eq!(factory.builds(), 4);
    }

    #[test]
    fn test_failed_initialize_can_retry() {
        let failing = StubFactory {
            fail_config: true,
            ..Default::default()
        };
        let session = Session::new();

        assert!(session.initialize(&failing).is_err());
        assert!(!session.is_initialized());
        assert!(session.services().is_err());

        let working = StubFactory::default();
        session.initialize(&working).unwrap();
        assert!(session.is_initialized());
    }

    #[test]
    fn test_sessions_are_independent() {
        let factory = StubFactory::default();
        let a = Session::new();
        let b = Session::new();
        a.initialize(&factory).unwrap();

        assert!(!b.is_initialized());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_config_snapshot_cached() {
        let session = Session::new();
        let services = session.initialize(&StubFactory::default()).unwrap();
        assert_eq!(services.config(), &DashboardConfig::default());
    }
}
