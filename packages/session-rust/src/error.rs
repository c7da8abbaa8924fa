use widget_sync_core::{SchemaError, WireError};

/// Errors surfaced by the bridge and its transport.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid config definition: {0}")]
    Schema(#[from] SchemaError),
    #[error("wire codec failed: {0}")]
    Wire(#[from] WireError),
    #[error("transport i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
