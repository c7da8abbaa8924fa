//! Bridge configuration.

use widget_sync_core::WireFormat;

/// Largest inbound frame accepted from the host, in bytes.
pub const MAX_INBOUND_FRAME: usize = 1_048_576;
/// Largest outbound frame written to the host, in bytes.
pub const MAX_OUTBOUND_FRAME: usize = 1_048_576;

/// Top-level configuration for a widget bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Whether the widget runs inside a host. When false the protocol never
    /// activates and the context is served from schema defaults.
    pub embedded: bool,
    /// Envelope encoding on the transport.
    pub wire_format: WireFormat,
    /// Bounded mpsc channel capacity for messages queued towards the host.
    pub outbound_channel_capacity: usize,
    pub max_inbound_frame: usize,
    pub max_outbound_frame: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            embedded: true,
            wire_format: WireFormat::Json,
            outbound_channel_capacity: 256,
            max_inbound_frame: MAX_INBOUND_FRAME,
            max_outbound_frame: MAX_OUTBOUND_FRAME,
        }
    }
}
