//! Host protocol state machine.
//!
//! [`Session`] owns the schema, the current value tree, the host link id and
//! the protocol [`Phase`]. It is a pure reducer: [`Session::mount`],
//! [`Session::handle`] and [`Session::apply_local`] mutate only the session and
//! return the messages to send, leaving delivery and observer notification to
//! the caller.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use widget_sync_core::{
    default_value_map, project, update_value, AsyncValue, ConfigDefinition, ConfigValueMap,
    LeafValue, Locator, MessageFromHost, MessageToHost, SchemaError, ValueSink, WidgetContext,
};

/// Protocol phase of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Not embedded in a host. Terminal: the protocol never activates.
    Standalone,
    /// Schema sent on mount; the host has not identified itself yet.
    AwaitingHostLink,
    /// The host asked for the schema and assigned a link id, but has not
    /// accepted it yet.
    LinkedWaitingForValues,
    /// The host accepted the schema; values mirror the host.
    LinkedReady,
    /// The host refused the schema. Terminal.
    Rejected { reason: String },
}

impl Phase {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Standalone | Self::Rejected { .. })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standalone => f.write_str("standalone"),
            Self::AwaitingHostLink => f.write_str("awaiting-host-link"),
            Self::LinkedWaitingForValues => f.write_str("linked-waiting-for-values"),
            Self::LinkedReady => f.write_str("linked-ready"),
            Self::Rejected { .. } => f.write_str("rejected"),
        }
    }
}

/// Human-readable message carried by the failed context after a rejection.
#[must_use]
pub fn rejection_message(reason: &str) -> String {
    format!("Workshop rejected the config definition due to the following reason: {reason}")
}

/// Outcome of one reducer step.
#[derive(Debug, Default, PartialEq)]
pub struct Transition {
    /// Messages to deliver to the host, in order.
    pub outbound: Vec<MessageToHost>,
    /// Whether observable state (phase, link or values) changed.
    pub changed: bool,
}

impl Transition {
    fn unchanged() -> Self {
        Self::default()
    }
}

/// Point-in-time copy of the observable session state. Cheap to clone: the
/// value tree is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub link_id: Option<Arc<str>>,
    pub values: ConfigValueMap,
}

/// One widget's protocol state: schema, mirrored values, host link and phase.
#[derive(Debug)]
pub struct Session {
    definition: Arc<ConfigDefinition>,
    values: ConfigValueMap,
    link_id: Option<Arc<str>>,
    phase: Phase,
}

impl Session {
    /// Creates a session seeded with the schema's default values.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema has duplicate sibling field ids.
    pub fn new(definition: ConfigDefinition, embedded: bool) -> Result<Self, SchemaError> {
        definition.validate()?;
        let values = default_value_map(&definition);
        Ok(Self {
            definition: Arc::new(definition),
            values,
            link_id: None,
            phase: if embedded {
                Phase::AwaitingHostLink
            } else {
                Phase::Standalone
            },
        })
    }

    #[must_use]
    pub fn definition(&self) -> &ConfigDefinition {
        &self.definition
    }

    #[must_use]
    pub fn values(&self) -> &ConfigValueMap {
        &self.values
    }

    #[must_use]
    pub fn link_id(&self) -> Option<&str> {
        self.link_id.as_deref()
    }

    /// Link id local writes are addressed to. `None` before any link and in
    /// terminal phases, where nothing is sent.
    #[must_use]
    pub fn outbound_link(&self) -> Option<&str> {
        if self.phase.is_terminal() {
            return None;
        }
        self.link_id()
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase.clone(),
            link_id: self.link_id.clone(),
            values: self.values.clone(),
        }
    }

    /// Announces the schema to the host. Repeating it is harmless; a
    /// standalone session sends nothing.
    pub fn mount(&mut self) -> Transition {
        if self.phase == Phase::Standalone {
            debug!("standalone session; not announcing schema");
            return Transition::unchanged();
        }
        Transition {
            outbound: vec![self.send_config()],
            changed: false,
        }
    }

    /// Applies one inbound host message.
    pub fn handle(&mut self, message: MessageFromHost) -> Transition {
        if self.phase.is_terminal() {
            debug!(
                kind = message.kind(),
                phase = %self.phase,
                "dropping host message in terminal phase"
            );
            return Transition::unchanged();
        }

        match message {
            MessageFromHost::RequestingConfig { link_id } => {
                let mut changed = self.record_link(&link_id);
                if self.phase == Phase::AwaitingHostLink {
                    self.enter(Phase::LinkedWaitingForValues);
                    changed = true;
                }
                Transition {
                    outbound: vec![self.send_config()],
                    changed,
                }
            }
            MessageFromHost::ConfigAccepted {
                link_id,
                config_values,
            } => {
                self.record_link(&link_id);
                self.enter(Phase::LinkedReady);
                self.values = config_values;
                Transition {
                    outbound: Vec::new(),
                    changed: true,
                }
            }
            MessageFromHost::ConfigRejected {
                link_id,
                rejection_reason,
            } => {
                self.record_link(&link_id);
                self.enter(Phase::Rejected {
                    reason: rejection_reason,
                });
                Transition {
                    outbound: Vec::new(),
                    changed: true,
                }
            }
            MessageFromHost::ValueChange {
                link_id,
                config_values,
            } => {
                if self.link_id.as_deref() != Some(link_id.as_str()) {
                    debug!(
                        link_id = %link_id,
                        current = ?self.link_id,
                        "dropping value change from stale link"
                    );
                    return Transition::unchanged();
                }
                self.values = config_values;
                Transition {
                    outbound: Vec::new(),
                    changed: true,
                }
            }
        }
    }

    /// Applies a local leaf update to the current value tree. Returns whether
    /// the tree changed; a locator that addresses nothing leaves it untouched.
    pub fn apply_local(&mut self, locator: &Locator, value: LeafValue) -> bool {
        let next = update_value(&self.values, locator, value);
        if next.ptr_eq(&self.values) {
            debug!(%locator, "local update addressed no leaf");
            return false;
        }
        self.values = next;
        true
    }

    /// The context as seen by local code.
    ///
    /// Loaded when standalone or linked-ready, failed after a rejection, and
    /// loading while the host has not accepted the schema.
    pub fn context(&self, sink: Arc<dyn ValueSink>) -> AsyncValue<WidgetContext> {
        match &self.phase {
            Phase::Standalone | Phase::LinkedReady => {
                AsyncValue::Loaded(project(&self.definition, &self.values, sink))
            }
            Phase::Rejected { reason } => AsyncValue::Failed(rejection_message(reason)),
            Phase::AwaitingHostLink | Phase::LinkedWaitingForValues => AsyncValue::Loading,
        }
    }

    fn send_config(&self) -> MessageToHost {
        MessageToHost::SendConfig {
            config: (*self.definition).clone(),
        }
    }

    fn record_link(&mut self, link_id: &str) -> bool {
        if self.link_id.as_deref() == Some(link_id) {
            return false;
        }
        debug!(link_id, "recording host link");
        self.link_id = Some(Arc::from(link_id));
        true
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            info!(from = %self.phase, to = %phase, "protocol phase changed");
            self.phase = phase;
        }
    }
}
