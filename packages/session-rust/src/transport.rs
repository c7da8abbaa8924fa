//! Transport boundary between a bridge and its host.
//!
//! Inbound frames are filtered by origin and decoded here before they reach
//! the protocol; outbound messages are queued on a bounded channel drained by
//! a writer task.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use widget_sync_core::{HostOutbox, MessageFromHost, MessageToHost, WireFormat};

use crate::bridge::WidgetBridge;
use crate::error::BridgeError;

/// Where an inbound frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    /// The embedding host.
    Parent,
    /// Another widget sharing the host, including same-origin ones.
    Sibling,
    Unknown,
}

/// One undecoded message as delivered by the transport.
#[derive(Debug, Clone)]
pub struct InboundFrame {
    pub source: FrameSource,
    pub payload: Vec<u8>,
}

impl InboundFrame {
    #[must_use]
    pub fn from_parent(payload: Vec<u8>) -> Self {
        Self {
            source: FrameSource::Parent,
            payload,
        }
    }
}

/// [`HostOutbox`] backed by a bounded mpsc channel.
///
/// Posting never blocks: when the queue is full the message is dropped and a
/// warning is logged on the 1st, 2nd, 4th, 8th, ... consecutive drop.
#[derive(Debug)]
pub struct ChannelOutbox {
    tx: mpsc::Sender<MessageToHost>,
    dropped: AtomicU64,
}

impl ChannelOutbox {
    /// Creates an outbox and the receiver its writer task drains.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MessageToHost>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                dropped: AtomicU64::new(0),
            },
            rx,
        )
    }

    /// Messages dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl HostOutbox for ChannelOutbox {
    fn post(&self, message: MessageToHost) {
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    warn!(
                        kind = message.kind(),
                        dropped, "outbound queue full; dropping message"
                    );
                }
            }
            Err(TrySendError::Closed(message)) => {
                warn!(kind = message.kind(), "outbound queue closed; dropping message");
            }
        }
    }
}

/// Decodes a frame if it should reach the protocol at all.
///
/// Frames from anywhere but the parent yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`BridgeError::Wire`] if a parent frame does not decode.
pub fn accept_frame(
    frame: &InboundFrame,
    format: WireFormat,
) -> Result<Option<MessageFromHost>, BridgeError> {
    if frame.source != FrameSource::Parent {
        debug!(source = ?frame.source, "ignoring frame not sent by the host");
        return Ok(None);
    }
    let message = format.decode::<MessageFromHost>(&frame.payload)?;
    Ok(Some(message))
}

/// Feeds inbound frames to `bridge` in delivery order until the channel closes.
///
/// A standalone bridge never processes a frame.
pub async fn run_inbound(
    bridge: WidgetBridge,
    format: WireFormat,
    mut frames: mpsc::Receiver<InboundFrame>,
) {
    let embedded = bridge.is_embedded();
    while let Some(frame) = frames.recv().await {
        if !embedded {
            debug!("standalone; ignoring inbound frame");
            continue;
        }
        match accept_frame(&frame, format) {
            Ok(Some(message)) => {
                debug!(kind = message.kind(), link_id = message.link_id(), "host message");
                bridge.handle(message);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, len = frame.payload.len(), "dropping undecodable frame");
            }
        }
    }
    debug!("inbound channel closed");
}
