use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Primary key of an ontology object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    String(String),
    Number(f64),
}

/// Reference to an ontology object, as handed to setters by local code.
///
/// `rid` is only valid within the current host session; `primary_key` is
/// stable and is what the value tree stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "$rid")]
    pub rid: String,
    #[serde(rename = "$primaryKey")]
    pub primary_key: PrimaryKey,
}

impl ObjectRef {
    pub fn new(rid: impl Into<String>, primary_key: PrimaryKey) -> Self {
        Self {
            rid: rid.into(),
            primary_key,
        }
    }
}

/// Value accepted by the setters of an input/output field.
///
/// Calendar values stay typed here; the codec turns them into strings before
/// they reach the value tree or the host.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalValue {
    String(String),
    Boolean(bool),
    Number(f64),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    StringList(Vec<String>),
    BooleanList(Vec<bool>),
    NumberList(Vec<f64>),
    DateList(Vec<NaiveDate>),
    TimestampList(Vec<DateTime<Utc>>),
    Objects(Vec<ObjectRef>),
}

impl From<&str> for LocalValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LocalValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for LocalValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for LocalValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for LocalValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for LocalValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<Vec<ObjectRef>> for LocalValue {
    fn from(value: Vec<ObjectRef>) -> Self {
        Self::Objects(value)
    }
}
