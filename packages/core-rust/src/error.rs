/// Schema-authoring defects. These are programming errors, not user errors:
/// a session must not start with a schema that produces one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate field id '{field_id}' among siblings at {path}")]
    DuplicateFieldId { field_id: String, path: String },
}

/// Errors from encoding or decoding protocol envelopes.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("msgpack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),
    #[error("msgpack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),
}
