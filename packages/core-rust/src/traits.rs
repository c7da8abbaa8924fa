use tracing::debug;

use crate::async_value::AsyncValue;
use crate::locator::Locator;
use crate::messages::{MessageToHost, PointerPayload};
use crate::values::{LeafValue, WireValue};

/// A write issued by a projected capability.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalWrite {
    /// A setter call: `value` goes into the local tree, `wire` to the host.
    /// `wire` is `None` when the value has no host representation.
    Value {
        locator: Locator,
        value: LeafValue,
        wire: Option<AsyncValue<WireValue>>,
    },
    /// An event trigger.
    Event {
        locator: Locator,
        pointer: Option<PointerPayload>,
    },
}

impl LocalWrite {
    #[must_use]
    pub fn locator(&self) -> &Locator {
        match self {
            Self::Value { locator, .. } | Self::Event { locator, .. } => locator,
        }
    }

    /// Host message for this write, or `None` when there is no host link.
    #[must_use]
    pub fn to_host(&self, link_id: Option<&str>) -> Option<MessageToHost> {
        let Some(link_id) = link_id else {
            debug!(locator = %self.locator(), "no host link; write stays local");
            return None;
        };
        Some(match self {
            Self::Value { locator, wire, .. } => MessageToHost::SetValue {
                link_id: link_id.to_string(),
                locator: locator.clone(),
                value: wire.clone(),
            },
            Self::Event { locator, pointer } => MessageToHost::ExecuteEvent {
                link_id: link_id.to_string(),
                locator: locator.clone(),
                pointer: pointer.clone(),
            },
        })
    }
}

/// Write path for projected capabilities.
///
/// Capabilities never touch a value tree or the host directly. They hand each
/// write to the sink, which applies it to whatever tree is current, reads the
/// host link current at that moment, and queues the host message before
/// anyone observes the new tree.
pub trait ValueSink: Send + Sync {
    fn submit(&self, write: LocalWrite);
}

/// Outbound queue towards the host. Implementations must not block.
pub trait HostOutbox: Send + Sync {
    fn post(&self, message: MessageToHost);
}
