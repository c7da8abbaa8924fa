//! Type-directed value codec.
//!
//! Local code hands setters a [`LocalValue`]. Before it reaches the value tree
//! it goes through [`to_storage`]; before it reaches the host it goes through
//! [`to_wire`]. The two differ only for object references: storage keeps
//! primary keys (stable, queryable), the wire carries rids (session-scoped).
//!
//! Dates become `yyyy-mm-dd` strings and timestamps RFC 3339 strings in both
//! forms, so downstream code never sees a calendar value with an ambiguous
//! time zone or time of day.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::schema::VariableType;
use crate::types::{LocalValue, ObjectRef, PrimaryKey};
use crate::values::{
    ObjectRids, ObjectSetLocators, ScalarValue, VariableValue, WireScalar, WireValue, MAX_OBJECTS,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a calendar date as `yyyy-mm-dd`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a `yyyy-mm-dd` string back into a calendar date.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Formats a timestamp as RFC 3339 with millisecond precision and a `Z` suffix.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn date_at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Storage form of a default value declared in the schema.
///
/// Struct types have no default materialization and yield `None`.
#[must_use]
pub fn default_value(variable_type: &VariableType) -> Option<VariableValue> {
    use ScalarValue as S;
    use VariableValue as V;

    match variable_type {
        VariableType::String { default_value } => {
            default_value.clone().map(|v| V::Scalar(S::String(v)))
        }
        VariableType::Boolean { default_value } => default_value.map(|v| V::Scalar(S::Boolean(v))),
        VariableType::Number { default_value } => default_value.map(|v| V::Scalar(S::Number(v))),
        VariableType::Date { default_value } => {
            default_value.map(|v| V::Scalar(S::String(format_date(v))))
        }
        VariableType::Timestamp { default_value } => {
            default_value.map(|v| V::Scalar(S::String(format_timestamp(v))))
        }
        VariableType::StringList { default_value } => default_value
            .as_ref()
            .map(|v| V::List(v.iter().cloned().map(S::String).collect())),
        VariableType::BooleanList { default_value } => default_value
            .as_ref()
            .map(|v| V::List(v.iter().copied().map(S::Boolean).collect())),
        VariableType::NumberList { default_value } => default_value
            .as_ref()
            .map(|v| V::List(v.iter().copied().map(S::Number).collect())),
        VariableType::DateList { default_value } => default_value
            .as_ref()
            .map(|v| V::List(v.iter().map(|d| S::String(format_date(*d))).collect())),
        VariableType::TimestampList { default_value } => default_value
            .as_ref()
            .map(|v| V::List(v.iter().map(|t| S::String(format_timestamp(*t))).collect())),
        VariableType::ObjectSet { default_value, .. } => {
            default_value.clone().map(|v| V::Scalar(S::ObjectSet(v)))
        }
        VariableType::Struct { .. } => None,
    }
}

/// Scalar text form of a calendar value for the given declared type.
///
/// Date-typed fields keep only the calendar date; every other type keeps the
/// full instant, anchoring bare dates at midnight UTC.
fn date_text(variable_type: &VariableType, date: NaiveDate) -> String {
    match variable_type {
        VariableType::Date { .. } | VariableType::DateList { .. } => format_date(date),
        _ => format_timestamp(date_at_midnight(date)),
    }
}

fn timestamp_text(variable_type: &VariableType, timestamp: DateTime<Utc>) -> String {
    match variable_type {
        VariableType::Date { .. } | VariableType::DateList { .. } => {
            format_date(timestamp.date_naive())
        }
        _ => format_timestamp(timestamp),
    }
}

/// Collapses object references to primary keys, capped at [`MAX_OBJECTS`].
///
/// Returns `None` when the keys are not all strings or all numbers.
#[must_use]
pub fn objects_to_locators(objects: &[ObjectRef]) -> Option<ObjectSetLocators> {
    let all_strings = objects
        .iter()
        .all(|o| matches!(o.primary_key, PrimaryKey::String(_)));
    if all_strings {
        let primary_keys = objects
            .iter()
            .take(MAX_OBJECTS)
            .filter_map(|o| match &o.primary_key {
                PrimaryKey::String(key) => Some(key.clone()),
                PrimaryKey::Number(_) => None,
            })
            .collect();
        return Some(ObjectSetLocators::String { primary_keys });
    }

    let all_numbers = objects
        .iter()
        .all(|o| matches!(o.primary_key, PrimaryKey::Number(_)));
    if all_numbers {
        let primary_keys = objects
            .iter()
            .take(MAX_OBJECTS)
            .filter_map(|o| match o.primary_key {
                PrimaryKey::Number(key) => Some(key),
                PrimaryKey::String(_) => None,
            })
            .collect();
        return Some(ObjectSetLocators::Number { primary_keys });
    }

    debug!(
        count = objects.len(),
        "object references mix string and number primary keys; dropping value"
    );
    None
}

/// Collapses object references to rids, capped at [`MAX_OBJECTS`].
#[must_use]
pub fn objects_to_rids(objects: &[ObjectRef]) -> ObjectRids {
    ObjectRids {
        object_rids: objects
            .iter()
            .take(MAX_OBJECTS)
            .map(|o| o.rid.clone())
            .collect(),
    }
}

/// Converts a setter argument to the form stored in the local value tree.
#[must_use]
pub fn to_storage(variable_type: &VariableType, value: Option<&LocalValue>) -> Option<VariableValue> {
    use ScalarValue as S;
    use VariableValue as V;

    if let VariableType::Struct { .. } = variable_type {
        warn!("struct fields are not supported; ignoring value");
        return None;
    }

    Some(match value? {
        LocalValue::Objects(objects) => V::Scalar(S::ObjectSet(objects_to_locators(objects)?)),
        LocalValue::String(v) => V::Scalar(S::String(v.clone())),
        LocalValue::Boolean(v) => V::Scalar(S::Boolean(*v)),
        LocalValue::Number(v) => V::Scalar(S::Number(*v)),
        LocalValue::Date(d) => V::Scalar(S::String(date_text(variable_type, *d))),
        LocalValue::Timestamp(t) => V::Scalar(S::String(timestamp_text(variable_type, *t))),
        LocalValue::StringList(v) => V::List(v.iter().cloned().map(S::String).collect()),
        LocalValue::BooleanList(v) => V::List(v.iter().copied().map(S::Boolean).collect()),
        LocalValue::NumberList(v) => V::List(v.iter().copied().map(S::Number).collect()),
        LocalValue::DateList(v) => V::List(
            v.iter()
                .map(|d| S::String(date_text(variable_type, *d)))
                .collect(),
        ),
        LocalValue::TimestampList(v) => V::List(
            v.iter()
                .map(|t| S::String(timestamp_text(variable_type, *t)))
                .collect(),
        ),
    })
}

/// Converts a setter argument to the form sent to the host.
#[must_use]
pub fn to_wire(variable_type: &VariableType, value: Option<&LocalValue>) -> Option<WireValue> {
    use WireScalar as S;
    use WireValue as V;

    if let VariableType::Struct { .. } = variable_type {
        return None;
    }

    Some(match value? {
        LocalValue::Objects(objects) => V::Scalar(S::ObjectRids(objects_to_rids(objects))),
        LocalValue::String(v) => V::Scalar(S::String(v.clone())),
        LocalValue::Boolean(v) => V::Scalar(S::Boolean(*v)),
        LocalValue::Number(v) => V::Scalar(S::Number(*v)),
        LocalValue::Date(d) => V::Scalar(S::String(date_text(variable_type, *d))),
        LocalValue::Timestamp(t) => V::Scalar(S::String(timestamp_text(variable_type, *t))),
        LocalValue::StringList(v) => V::List(v.iter().cloned().map(S::String).collect()),
        LocalValue::BooleanList(v) => V::List(v.iter().copied().map(S::Boolean).collect()),
        LocalValue::NumberList(v) => V::List(v.iter().copied().map(S::Number).collect()),
        LocalValue::DateList(v) => V::List(
            v.iter()
                .map(|d| S::String(date_text(variable_type, *d)))
                .collect(),
        ),
        LocalValue::TimestampList(v) => V::List(
            v.iter()
                .map(|t| S::String(timestamp_text(variable_type, *t)))
                .collect(),
        ),
    })
}
