//! Busy indicator for in-flight collaborator calls
//!
//! [`BusyIndicator::begin`] returns a guard; the indicator stays active until
//! the guard drops, so it clears on success, on error and on early return.

use std::fmt;
use std::sync::{PoisonError, RwLock};

type Listener = Box<dyn Fn(Option<&str>) + Send + Sync>;

/// Tracks the label of the single in-flight call, if any
#[derive(Default)]
pub struct BusyIndicator {
    label: RwLock<Option<String>>,
    listener: Option<Listener>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify `listener` on every change; `None` means idle
    pub fn with_listener<F>(listener: F) -> Self
    where
        F: Fn(Option<&str>) + Send + Sync + 'static,
    {
        Self {
            label: RwLock::new(None),
            listener: Some(Box::new(listener)),
        }
    }

    /// Mark a call in flight until the returned guard is dropped
    pub fn begin(&self, label: impl Into<String>) -> BusyGuard<'_> {
        let label = label.into();
        tracing::debug!(%label, "busy");
        if let Some(listener) = &self.listener {
            listener(Some(&label));
        }
        *self.label.write().unwrap_or_else(PoisonError::into_inner) = Some(label);
        BusyGuard { indicator: self }
    }

    pub fn is_busy(&self) -> bool {
        self.label
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Label of the in-flight call
    pub fn label(&self) -> Option<String> {
        self.label
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        *self.label.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Some(listener) = &self.listener {
            listener(None);
        }
    }
}

impl fmt::Debug for BusyIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusyIndicator")
            .field("label", &self.label())
            .finish_non_exhaustive()
    }
}

/// Clears the indicator when dropped
#[must_use = "the indicator clears as soon as the guard is dropped"]
pub struct BusyGuard<'a> {
    indicator: &'a BusyIndicator,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.indicator.clear();
    }
}
