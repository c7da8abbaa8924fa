//! Messages received from the host.

use serde::{Deserialize, Serialize};

use crate::values::ConfigValueMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessageFromHost {
    /// The host validated the schema and supplies the current values.
    #[serde(rename = "workshop-accepted-config", rename_all = "camelCase")]
    ConfigAccepted {
        #[serde(rename = "iframeWidgetId")]
        link_id: String,
        config_values: ConfigValueMap,
    },

    #[serde(rename = "workshop-rejected-config", rename_all = "camelCase")]
    ConfigRejected {
        #[serde(rename = "iframeWidgetId")]
        link_id: String,
        rejection_reason: String,
    },

    /// The host's config panel opened; it wants the schema again to detect drift.
    #[serde(rename = "workshop-requesting-config")]
    RequestingConfig {
        #[serde(rename = "iframeWidgetId")]
        link_id: String,
    },

    /// Values changed on the host side. Always a full snapshot.
    #[serde(rename = "workshop-value-change", rename_all = "camelCase")]
    ValueChange {
        #[serde(rename = "iframeWidgetId")]
        link_id: String,
        config_values: ConfigValueMap,
    },
}

impl MessageFromHost {
    #[must_use]
    pub fn link_id(&self) -> &str {
        match self {
            Self::ConfigAccepted { link_id, .. }
            | Self::ConfigRejected { link_id, .. }
            | Self::RequestingConfig { link_id }
            | Self::ValueChange { link_id, .. } => link_id,
        }
    }

    /// Short name for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigAccepted { .. } => "config-accepted",
            Self::ConfigRejected { .. } => "config-rejected",
            Self::RequestingConfig { .. } => "requesting-config",
            Self::ValueChange { .. } => "value-change",
        }
    }
}
