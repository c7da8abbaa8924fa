//! Session observer trait and composite implementation.
//!
//! Defines [`ContextObserver`] for reacting to published session changes,
//! [`CompositeObserver`] which fans out to multiple observers, and
//! [`TracingObserver`] which logs each change.

use std::sync::Arc;

use tracing::{debug, info};

use crate::state::{Phase, SessionSnapshot};

/// Observer for published session changes.
///
/// Called after every value tree replacement and every phase or link change,
/// with the session lock released. Implementations may call back into the
/// bridge.
///
/// Used as `Arc<dyn ContextObserver>`.
pub trait ContextObserver: Send + Sync {
    fn on_change(&self, snapshot: &SessionSnapshot);
}

/// Composite observer that fans out to multiple observers in registration order.
#[derive(Default, Clone)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ContextObserver>>,
}

impl CompositeObserver {
    /// Creates a composite observer with the given observers.
    #[must_use]
    pub fn new(observers: Vec<Arc<dyn ContextObserver>>) -> Self {
        Self { observers }
    }

    /// Adds an observer after construction.
    pub fn add(&mut self, observer: Arc<dyn ContextObserver>) {
        self.observers.push(observer);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl ContextObserver for CompositeObserver {
    fn on_change(&self, snapshot: &SessionSnapshot) {
        for observer in &self.observers {
            observer.on_change(snapshot);
        }
    }
}

/// Logs every published change.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ContextObserver for TracingObserver {
    fn on_change(&self, snapshot: &SessionSnapshot) {
        match &snapshot.phase {
            Phase::Rejected { reason } => info!(reason = %reason, "host rejected config"),
            phase => debug!(
                phase = %phase,
                link_id = ?snapshot.link_id,
                fields = snapshot.values.len(),
                "session updated"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use widget_sync_core::ConfigValueMap;

    use super::*;

    struct CountingObserver {
        calls: AtomicUsize,
    }

    impl CountingObserver {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ContextObserver for CountingObserver {
        fn on_change(&self, _: &SessionSnapshot) {
            self.calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(phase: Phase) -> SessionSnapshot {
        SessionSnapshot {
            phase,
            link_id: None,
            values: ConfigValueMap::new(),
        }
    }

    #[test]
    fn empty_composite_does_not_panic() {
        let composite = CompositeObserver::default();
        composite.on_change(&snapshot(Phase::AwaitingHostLink));
        assert!(composite.is_empty());
    }

    #[test]
    fn composite_fans_out_to_all() {
        let first = Arc::new(CountingObserver::new());
        let second = Arc::new(CountingObserver::new());
        let mut composite = CompositeObserver::new(vec![first.clone()]);
        composite.add(second.clone());
        composite.add(Arc::new(TracingObserver));

        composite.on_change(&snapshot(Phase::LinkedReady));
        composite.on_change(&snapshot(Phase::Rejected {
            reason: "bad".into(),
        }));

        assert_eq!(composite.len(), 3);
        assert_eq!(first.calls.load(Ordering::Relaxed), 2);
        assert_eq!(second.calls.load(Ordering::Relaxed), 2);
    }
}
