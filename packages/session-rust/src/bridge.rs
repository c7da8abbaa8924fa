//! Shared handle owning one widget session.
//!
//! [`WidgetBridge`] is the single update entry point. Host messages arrive
//! through [`WidgetBridge::handle`]; local setters reach it through the
//! [`ValueSink`] handed to every projected context. Both paths mutate the
//! session under one lock, then deliver outbound messages and notify
//! observers after the lock is released. Outbound messages always go out
//! before observers run, so host order follows local apply order even when an
//! observer writes back.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::debug;
use widget_sync_core::{
    AsyncValue, ConfigDefinition, HostOutbox, LocalWrite, MessageFromHost, ValueSink,
    WidgetContext,
};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::observer::{CompositeObserver, ContextObserver};
use crate::state::{Phase, Session, SessionSnapshot, Transition};

/// Cloneable handle to a widget session. All clones share the same state.
#[derive(Clone)]
pub struct WidgetBridge {
    shared: Arc<Shared>,
}

struct Shared {
    session: Mutex<Session>,
    outbox: Arc<dyn HostOutbox>,
    observers: RwLock<CompositeObserver>,
}

/// Sink handed to projected contexts. Holds the bridge weakly so a context
/// cached by an observer does not keep the bridge alive.
struct BridgeSink {
    shared: Weak<Shared>,
}

impl WidgetBridge {
    /// Creates a bridge for `definition`, delivering host messages to `outbox`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Schema`] if the schema is malformed.
    pub fn new(
        definition: ConfigDefinition,
        config: &BridgeConfig,
        outbox: Arc<dyn HostOutbox>,
    ) -> Result<Self, BridgeError> {
        let session = Session::new(definition, config.embedded)?;
        Ok(Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                outbox,
                observers: RwLock::new(CompositeObserver::default()),
            }),
        })
    }

    /// Registers an observer for every subsequent published change.
    pub fn subscribe(&self, observer: Arc<dyn ContextObserver>) {
        self.shared.observers.write().add(observer);
    }

    /// Announces the schema to the host, when embedded.
    pub fn mount(&self) {
        let step = self.shared.session.lock().mount();
        self.shared.finish(step);
    }

    /// Feeds one inbound host message through the protocol.
    pub fn handle(&self, message: MessageFromHost) {
        let step = self.shared.session.lock().handle(message);
        self.shared.finish(step);
    }

    /// Current context: loaded once usable, failed after a rejection,
    /// loading while waiting for the host.
    #[must_use]
    pub fn context(&self) -> AsyncValue<WidgetContext> {
        let sink: Arc<dyn ValueSink> = Arc::new(BridgeSink {
            shared: Arc::downgrade(&self.shared),
        });
        self.shared.session.lock().context(sink)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.session.lock().snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.session.lock().phase().clone()
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        *self.shared.session.lock().phase() != Phase::Standalone
    }
}

impl fmt::Debug for WidgetBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetBridge")
            .field("session", &*self.shared.session.lock())
            .finish_non_exhaustive()
    }
}

impl Shared {
    /// Delivers a reducer step. Must be called without the session lock held.
    fn finish(&self, step: Transition) {
        for message in step.outbound {
            self.outbox.post(message);
        }
        if step.changed {
            let snapshot = self.session.lock().snapshot();
            self.notify(&snapshot);
        }
    }

    /// Applies a local write against the current tree and link.
    fn submit(&self, write: LocalWrite) {
        let (message, snapshot) = {
            let mut session = self.session.lock();
            let message = write.to_host(session.outbound_link());
            let snapshot = match write {
                LocalWrite::Value { locator, value, .. } => session
                    .apply_local(&locator, value)
                    .then(|| session.snapshot()),
                LocalWrite::Event { .. } => None,
            };
            (message, snapshot)
        };
        if let Some(message) = message {
            self.outbox.post(message);
        }
        if let Some(snapshot) = snapshot {
            self.notify(&snapshot);
        }
    }

    fn notify(&self, snapshot: &SessionSnapshot) {
        let observers = self.observers.read().clone();
        observers.on_change(snapshot);
    }
}

impl ValueSink for BridgeSink {
    fn submit(&self, write: LocalWrite) {
        match self.shared.upgrade() {
            Some(shared) => shared.submit(write),
            None => debug!(locator = %write.locator(), "bridge dropped; ignoring local write"),
        }
    }
}
