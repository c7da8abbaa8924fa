//! Structural path addressing one leaf of a value tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Path to a leaf inside a [`ConfigValueMap`](crate::ConfigValueMap).
///
/// A locator carries no value and stays valid across snapshots of the same
/// shape. Two locators built from the same path compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Locator {
    #[serde(rename_all = "camelCase")]
    Single { config_field_id: String },
    #[serde(rename_all = "camelCase")]
    ListOf {
        config_field_id: String,
        index: usize,
        locator: Box<Locator>,
    },
}

impl Locator {
    pub fn single(config_field_id: impl Into<String>) -> Self {
        Self::Single {
            config_field_id: config_field_id.into(),
        }
    }

    /// Addresses `inner` within element `index` of repeated group `config_field_id`.
    pub fn list_of(config_field_id: impl Into<String>, index: usize, inner: Locator) -> Self {
        Self::ListOf {
            config_field_id: config_field_id.into(),
            index,
            locator: Box::new(inner),
        }
    }

    /// The field id at the head of the path.
    #[must_use]
    pub fn config_field_id(&self) -> &str {
        match self {
            Self::Single { config_field_id } | Self::ListOf { config_field_id, .. } => {
                config_field_id
            }
        }
    }

    /// Number of path segments, counting the leaf.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::ListOf { locator, .. } => 1 + locator.depth(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { config_field_id } => write!(f, "{config_field_id}"),
            Self::ListOf {
                config_field_id,
                index,
                locator,
            } => write!(f, "{config_field_id}[{index}].{locator}"),
        }
    }
}
