//! Messages sent from the widget to the host.

use serde::{Deserialize, Serialize};

use crate::async_value::AsyncValue;
use crate::locator::Locator;
use crate::schema::ConfigDefinition;
use crate::values::WireValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MessageToHost {
    /// Publishes (or republishes) the schema.
    #[serde(rename = "react-app-sending-config")]
    SendConfig { config: ConfigDefinition },

    /// Pushes one leaf's new state. The host has no null inside the async
    /// wrapper, so an absent value is sent as no `value` at all.
    #[serde(rename = "react-app-setting-value")]
    SetValue {
        #[serde(rename = "iframeWidgetId")]
        link_id: String,
        #[serde(rename = "valueLocator")]
        locator: Locator,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        value: Option<AsyncValue<WireValue>>,
    },

    /// Fires an event leaf.
    #[serde(rename = "react-app-executing-event")]
    ExecuteEvent {
        #[serde(rename = "iframeWidgetId")]
        link_id: String,
        #[serde(rename = "eventLocator")]
        locator: Locator,
        #[serde(rename = "mouseEvent", skip_serializing_if = "Option::is_none", default)]
        pointer: Option<PointerPayload>,
    },
}

impl MessageToHost {
    /// Short name for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SendConfig { .. } => "send-config",
            Self::SetValue { .. } => "set-value",
            Self::ExecuteEvent { .. } => "execute-event",
        }
    }
}

/// The serializable part of the pointer event that triggered an event leaf.
/// Lets the host react to modifier keys, e.g. open in a new tab on ctrl-click.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerPayload {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub button: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ctrl_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub shift_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub alt_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub client_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub client_y: Option<f64>,
}
