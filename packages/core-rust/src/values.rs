//! Value tree and the value representations that live in it.
//!
//! [`ConfigValueMap`] mirrors a [`ConfigDefinition`](crate::ConfigDefinition):
//! one [`ValueEntry`] per field id, with repeated groups holding a sequence of
//! nested maps. Maps are never mutated after publication; every change builds a
//! new map that shares unchanged entries by `Arc`, so `ptr_eq` is a valid
//! change-detection shortcut.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::async_value::AsyncValue;

/// Upper bound on object references carried by a single value.
pub const MAX_OBJECTS: usize = 10_000;

/// Object-set value addressed by primary key. Homogeneous: all keys share one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectSetLocators {
    #[serde(rename_all = "camelCase")]
    String { primary_keys: Vec<String> },
    #[serde(rename_all = "camelCase")]
    Number { primary_keys: Vec<f64> },
}

impl ObjectSetLocators {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::String { primary_keys } => primary_keys.len(),
            Self::Number { primary_keys } => primary_keys.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Object-set value addressed by session-scoped object rids. Only sent to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRids {
    pub object_rids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructValue {
    pub struct_fields: BTreeMap<String, Option<VariableValue>>,
}

/// Scalar held in the value tree. Dates and timestamps are strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Boolean(bool),
    Number(f64),
    String(String),
    ObjectSet(ObjectSetLocators),
    Struct(StructValue),
}

/// Value held in the value tree and read by local code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Scalar(ScalarValue),
    List(Vec<ScalarValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStructValue {
    pub struct_fields: BTreeMap<String, Option<WireValue>>,
}

/// Scalar in the form the host accepts on `set-value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Boolean(bool),
    Number(f64),
    String(String),
    ObjectRids(ObjectRids),
    Struct(WireStructValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Scalar(WireScalar),
    List(Vec<WireScalar>),
}

/// Current state of a single leaf.
pub type LeafValue = AsyncValue<Option<VariableValue>>;

/// One field's entry in the value tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueEntry {
    Single { value: LeafValue },
    #[serde(rename_all = "camelCase")]
    ListOf { list_of_values: Vec<ConfigValueMap> },
}

/// Immutable snapshot of field values, keyed by field id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigValueMap {
    entries: Arc<BTreeMap<String, Arc<ValueEntry>>>,
}

impl ConfigValueMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, field_id: &str) -> Option<&ValueEntry> {
        self.entries.get(field_id).map(AsRef::as_ref)
    }

    /// Returns the shared handle for an entry, for identity comparisons.
    #[must_use]
    pub fn get_shared(&self, field_id: &str) -> Option<&Arc<ValueEntry>> {
        self.entries.get(field_id)
    }

    /// The leaf value for `field_id`, if that field is a `Single` entry.
    #[must_use]
    pub fn single(&self, field_id: &str) -> Option<&LeafValue> {
        match self.get(field_id)? {
            ValueEntry::Single { value } => Some(value),
            ValueEntry::ListOf { .. } => None,
        }
    }

    /// The repeated-group elements for `field_id`, if that field is a `ListOf` entry.
    #[must_use]
    pub fn list_of(&self, field_id: &str) -> Option<&[ConfigValueMap]> {
        match self.get(field_id)? {
            ValueEntry::ListOf { list_of_values } => Some(list_of_values),
            ValueEntry::Single { .. } => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when both snapshots are the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Returns a new map with `field_id` set to `entry`. `self` is left untouched
    /// and every other entry is shared with the result.
    #[must_use]
    pub fn with_entry(&self, field_id: impl Into<String>, entry: ValueEntry) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(field_id.into(), Arc::new(entry));
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl FromIterator<(String, ValueEntry)> for ConfigValueMap {
    fn from_iter<I: IntoIterator<Item = (String, ValueEntry)>>(iter: I) -> Self {
        Self {
            entries: Arc::new(iter.into_iter().map(|(k, v)| (k, Arc::new(v))).collect()),
        }
    }
}

impl Serialize for ConfigValueMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field_id, entry) in self.entries.iter() {
            map.serialize_entry(field_id, entry.as_ref())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ConfigValueMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, ValueEntry>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
