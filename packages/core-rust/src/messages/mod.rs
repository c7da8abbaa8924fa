//! Wire-compatible message envelopes exchanged with the host.
//!
//! Both directions are internally tagged enums keyed by `type`, with camelCase
//! field names matching the host's wire format. Envelopes can travel as JSON
//! or as named `MsgPack` (`rmp_serde::to_vec_named()`); see [`WireFormat`].

pub mod from_host;
pub mod to_host;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::WireError;

pub use from_host::MessageFromHost;
pub use to_host::{MessageToHost, PointerPayload};

/// Encoding used for envelopes on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    MsgPack,
}

impl WireFormat {
    /// Encodes an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] if the value cannot be represented in this format.
    pub fn encode<T: Serialize>(self, message: &T) -> Result<Vec<u8>, WireError> {
        Ok(match self {
            Self::Json => serde_json::to_vec(message)?,
            Self::MsgPack => rmp_serde::to_vec_named(message)?,
        })
    }

    /// Decodes an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] for malformed payloads and unknown discriminants.
    pub fn decode<T: DeserializeOwned>(self, payload: &[u8]) -> Result<T, WireError> {
        Ok(match self {
            Self::Json => serde_json::from_slice(payload)?,
            Self::MsgPack => rmp_serde::from_slice(payload)?,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Envelope tests: discriminators, field naming, and decode behavior for
    //! both wire formats.

    use serde_json::json;

    use super::*;
    use crate::async_value::AsyncValue;
    use crate::locator::Locator;
    use crate::schema::{ConfigDefinition, ConfigField, VariableType};
    use crate::values::{ConfigValueMap, WireScalar, WireValue};

    fn schema() -> ConfigDefinition {
        ConfigDefinition::new(vec![
            ConfigField::input_output("name", "Name", VariableType::String { default_value: None }),
            ConfigField::event("go", "Go"),
        ])
    }

    #[test]
    fn outbound_discriminators_match_host() {
        let cases: Vec<(MessageToHost, &str)> = vec![
            (
                MessageToHost::SendConfig { config: schema() },
                "react-app-sending-config",
            ),
            (
                MessageToHost::SetValue {
                    link_id: "w1".into(),
                    locator: Locator::single("name"),
                    value: Some(AsyncValue::Loaded(WireValue::Scalar(WireScalar::String(
                        "x".into(),
                    )))),
                },
                "react-app-setting-value",
            ),
            (
                MessageToHost::ExecuteEvent {
                    link_id: "w1".into(),
                    locator: Locator::single("go"),
                    pointer: None,
                },
                "react-app-executing-event",
            ),
        ];

        for (msg, expected_tag) in cases {
            let bytes = WireFormat::MsgPack.encode(&msg).expect("serialize");
            let value: rmpv::Value =
                rmpv::decode::read_value(&mut &bytes[..]).expect("decode as Value");
            let map = value.as_map().expect("top-level should be a MsgPack map");
            let type_entries: Vec<_> = map
                .iter()
                .filter(|(k, _)| k.as_str() == Some("type"))
                .collect();
            assert_eq!(type_entries.len(), 1);
            assert_eq!(type_entries[0].1.as_str(), Some(expected_tag));

            let json = WireFormat::Json.encode(&msg).expect("serialize json");
            let decoded: MessageToHost = WireFormat::Json.decode(&json).expect("decode json");
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn set_value_uses_host_field_names() {
        let msg = MessageToHost::SetValue {
            link_id: "w1".into(),
            locator: Locator::list_of("rows", 0, Locator::single("name")),
            value: None,
        };
        let encoded = serde_json::to_value(&msg).expect("encode");
        assert_eq!(encoded["iframeWidgetId"], "w1");
        assert_eq!(encoded["valueLocator"]["type"], "listOf");
        assert!(encoded.get("value").is_none());
    }

    #[test]
    fn execute_event_carries_pointer_payload() {
        let msg = MessageToHost::ExecuteEvent {
            link_id: "w1".into(),
            locator: Locator::single("go"),
            pointer: Some(PointerPayload {
                ctrl_key: Some(true),
                button: Some(0),
                ..PointerPayload::default()
            }),
        };
        let encoded = serde_json::to_value(&msg).expect("encode");
        assert_eq!(encoded["eventLocator"], json!({ "type": "single", "configFieldId": "go" }));
        assert_eq!(encoded["mouseEvent"], json!({ "button": 0, "ctrlKey": true }));
    }

    #[test]
    fn decodes_inbound_messages() {
        let accepted: MessageFromHost = WireFormat::Json
            .decode(
                json!({
                    "type": "workshop-accepted-config",
                    "iframeWidgetId": "w1",
                    "configValues": {
                        "name": { "type": "single", "value": { "status": "LOADED", "value": "a" } }
                    }
                })
                .to_string()
                .as_bytes(),
            )
            .expect("decode accepted");
        assert_eq!(accepted.link_id(), "w1");
        let MessageFromHost::ConfigAccepted { config_values, .. } = accepted else {
            panic!("expected accepted");
        };
        assert_eq!(config_values.len(), 1);

        let rejected: MessageFromHost = serde_json::from_value(json!({
            "type": "workshop-rejected-config",
            "iframeWidgetId": "w2",
            "rejectionReason": "bad"
        }))
        .expect("decode rejected");
        assert_eq!(
            rejected,
            MessageFromHost::ConfigRejected {
                link_id: "w2".into(),
                rejection_reason: "bad".into()
            }
        );

        let requesting: MessageFromHost = serde_json::from_value(json!({
            "type": "workshop-requesting-config",
            "iframeWidgetId": "w3"
        }))
        .expect("decode requesting");
        assert_eq!(requesting.kind(), "requesting-config");

        let change: MessageFromHost = serde_json::from_value(json!({
            "type": "workshop-value-change",
            "iframeWidgetId": "w3",
            "configValues": {}
        }))
        .expect("decode value change");
        assert_eq!(
            change,
            MessageFromHost::ValueChange {
                link_id: "w3".into(),
                config_values: ConfigValueMap::new()
            }
        );
    }

    #[test]
    fn unknown_discriminant_fails_closed() {
        let result: Result<MessageFromHost, _> = WireFormat::Json
            .decode(br#"{"type":"workshop-self-destruct","iframeWidgetId":"w"}"#);
        assert!(result.is_err());

        let result: Result<MessageFromHost, _> = WireFormat::MsgPack.decode(&[0xc1]);
        assert!(result.is_err());
    }

    #[test]
    fn inbound_round_trips_through_msgpack() {
        let msg = MessageFromHost::ConfigAccepted {
            link_id: "w1".into(),
            config_values: crate::defaults::default_value_map(&schema()),
        };
        let bytes = WireFormat::MsgPack.encode(&msg).expect("serialize");
        let decoded: MessageFromHost = WireFormat::MsgPack.decode(&bytes).expect("deserialize");
        assert_eq!(decoded, msg);
    }
}
