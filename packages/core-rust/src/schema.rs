//! Schema tree: the declarative, immutable description of a widget's config fields.
//!
//! A [`ConfigDefinition`] is an ordered list of fields. Each field is either a
//! single leaf (an input/output variable or an event) or a repeated group whose
//! shape is itself a nested [`ConfigDefinition`].
//!
//! The wire shape matches what the host expects: discriminants live under a
//! `type` key and field names are camelCase.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::values::ObjectSetLocators;

/// Ordered list of config fields. `field_id` must be unique among siblings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDefinition(pub Vec<ConfigField>);

/// A config field: its identifier and its content specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigField {
    /// Property name of this field in the projected context.
    pub field_id: String,
    pub field: FieldKind,
}

/// Content of a config field: a single leaf, or a repeated group of nested fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    #[serde(rename_all = "camelCase")]
    Single {
        field_value: FieldValueKind,
        label: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        helper_text: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ListOf {
        config: ConfigDefinition,
        label: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        helper_text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        add_button_text: Option<String>,
    },
}

/// What a leaf carries: a typed value the widget reads and writes, or an event it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldValueKind {
    #[serde(rename_all = "camelCase")]
    InputOutput { variable_type: VariableType },
    Event,
}

/// Variable types supported by the host, each with an optional default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum VariableType {
    String {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<String>,
    },
    Boolean {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<bool>,
    },
    Number {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<f64>,
    },
    /// The host drops the time of day; only the calendar date is kept.
    Date {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<NaiveDate>,
    },
    Timestamp {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<DateTime<Utc>>,
    },
    StringList {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<Vec<String>>,
    },
    BooleanList {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<Vec<bool>>,
    },
    NumberList {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<Vec<f64>>,
    },
    DateList {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<Vec<NaiveDate>>,
    },
    TimestampList {
        #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none", default)]
        default_value: Option<Vec<DateTime<Utc>>>,
    },
    #[serde(rename = "objectSet", rename_all = "camelCase")]
    ObjectSet {
        object_type_id: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        default_value: Option<ObjectSetLocators>,
    },
    /// Declared by the host protocol but not wired up: struct fields get no
    /// default value and their setters store nothing.
    #[serde(rename_all = "camelCase")]
    Struct {
        struct_field_types: Vec<StructFieldType>,
    },
}

/// A field inside a struct variable. Nested structs are not supported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructFieldType {
    pub field_id: String,
    pub field_type: VariableType,
}

impl VariableType {
    /// The wire discriminant, used in log fields.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Boolean { .. } => "boolean",
            Self::Number { .. } => "number",
            Self::Date { .. } => "date",
            Self::Timestamp { .. } => "timestamp",
            Self::StringList { .. } => "string-list",
            Self::BooleanList { .. } => "boolean-list",
            Self::NumberList { .. } => "number-list",
            Self::DateList { .. } => "date-list",
            Self::TimestampList { .. } => "timestamp-list",
            Self::ObjectSet { .. } => "objectSet",
            Self::Struct { .. } => "struct",
        }
    }
}

impl ConfigField {
    /// Builds an input/output leaf.
    pub fn input_output(
        field_id: impl Into<String>,
        label: impl Into<String>,
        variable_type: VariableType,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            field: FieldKind::Single {
                field_value: FieldValueKind::InputOutput { variable_type },
                label: label.into(),
                helper_text: None,
            },
        }
    }

    /// Builds an event leaf.
    pub fn event(field_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            field: FieldKind::Single {
                field_value: FieldValueKind::Event,
                label: label.into(),
                helper_text: None,
            },
        }
    }

    /// Builds a repeated group.
    pub fn list_of(
        field_id: impl Into<String>,
        label: impl Into<String>,
        config: ConfigDefinition,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            field: FieldKind::ListOf {
                config,
                label: label.into(),
                helper_text: None,
                add_button_text: None,
            },
        }
    }
}

impl ConfigDefinition {
    /// Creates a definition from fields in declaration order.
    #[must_use]
    pub fn new(fields: Vec<ConfigField>) -> Self {
        Self(fields)
    }

    /// Iterates the top-level fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &ConfigField> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks that field ids are unique among siblings at every nesting level.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateFieldId`] for the first duplicate found,
    /// with the dotted path of the enclosing repeated groups.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.validate_at("")
    }

    fn validate_at(&self, path: &str) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in &self.0 {
            if !seen.insert(field.field_id.as_str()) {
                return Err(SchemaError::DuplicateFieldId {
                    field_id: field.field_id.clone(),
                    path: if path.is_empty() {
                        "<root>".to_string()
                    } else {
                        path.to_string()
                    },
                });
            }
            if let FieldKind::ListOf { config, .. } = &field.field {
                let nested = if path.is_empty() {
                    field.field_id.clone()
                } else {
                    format!("{path}.{}", field.field_id)
                };
                config.validate_at(&nested)?;
            }
        }
        Ok(())
    }
}
