//! Five-state async value lattice.
//!
//! Every leaf value, and the widget context as a whole, is exposed as an
//! [`AsyncValue`]. Consumers observe `Loading`/`Reloading` as a *state*; the
//! host round-trip that resolves it arrives later as an inbound message.
//!
//! # Wire format
//!
//! The host encodes the lattice as a map keyed by `status`
//! (`NOT_STARTED`, `LOADING`, `LOADED`, `RELOADING`, `FAILED`) with sibling
//! `value`, `progress`, and `error` keys. A missing or null `status` decodes as
//! [`AsyncValue::NotStarted`].

use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An asynchronously loaded value of type `V`, failing with an error of type `E`.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncValue<V, E = String> {
    /// Loading has not begun.
    NotStarted,
    /// Loading is in progress and no prior value is available.
    Loading,
    /// Loading completed with a value.
    Loaded(V),
    /// A new value is loading; the previous value is still available.
    Reloading {
        value: V,
        /// Optional progress hint, conventionally a percentage.
        progress: Option<f64>,
    },
    /// Loading failed.
    Failed(E),
}

impl<V, E> Default for AsyncValue<V, E> {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl<V, E> AsyncValue<V, E> {
    /// Shorthand for `Reloading` without a progress hint.
    pub fn reloading(value: V) -> Self {
        Self::Reloading {
            value,
            progress: None,
        }
    }

    #[must_use]
    pub fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStarted)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    #[must_use]
    pub fn is_reloading(&self) -> bool {
        matches!(self, Self::Reloading { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the carried value for `Loaded` and `Reloading`.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Loaded(value) | Self::Reloading { value, .. } => Some(value),
            Self::NotStarted | Self::Loading | Self::Failed(_) => None,
        }
    }

    /// Returns the error for `Failed`.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Borrows the carried value and error.
    pub fn as_ref(&self) -> AsyncValue<&V, &E> {
        match self {
            Self::NotStarted => AsyncValue::NotStarted,
            Self::Loading => AsyncValue::Loading,
            Self::Loaded(value) => AsyncValue::Loaded(value),
            Self::Reloading { value, progress } => AsyncValue::Reloading {
                value,
                progress: *progress,
            },
            Self::Failed(error) => AsyncValue::Failed(error),
        }
    }

    /// Maps the carried value, keeping the state.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> AsyncValue<U, E> {
        match self {
            Self::NotStarted => AsyncValue::NotStarted,
            Self::Loading => AsyncValue::Loading,
            Self::Loaded(value) => AsyncValue::Loaded(f(value)),
            Self::Reloading { value, progress } => AsyncValue::Reloading {
                value: f(value),
                progress,
            },
            Self::Failed(error) => AsyncValue::Failed(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Status {
    NotStarted,
    Loading,
    Loaded,
    Reloading,
    Failed,
}

#[derive(Serialize)]
struct RawAsyncValueRef<'a, V, E> {
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a E>,
}

#[derive(Deserialize)]
struct RawAsyncValue<V, E> {
    #[serde(default)]
    status: Option<Status>,
    #[serde(default = "Option::default")]
    value: Option<V>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default = "Option::default")]
    error: Option<E>,
}

impl<V: Serialize, E: Serialize> Serialize for AsyncValue<V, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match self {
            Self::NotStarted => RawAsyncValueRef {
                status: Status::NotStarted,
                value: None,
                progress: None,
                error: None,
            },
            Self::Loading => RawAsyncValueRef {
                status: Status::Loading,
                value: None,
                progress: None,
                error: None,
            },
            Self::Loaded(value) => RawAsyncValueRef {
                status: Status::Loaded,
                value: Some(value),
                progress: None,
                error: None,
            },
            Self::Reloading { value, progress } => RawAsyncValueRef {
                status: Status::Reloading,
                value: Some(value),
                progress: *progress,
                error: None,
            },
            Self::Failed(error) => RawAsyncValueRef {
                status: Status::Failed,
                value: None,
                progress: None,
                error: Some(error),
            },
        };
        raw.serialize(serializer)
    }
}

impl<'de, V, E> Deserialize<'de> for AsyncValue<V, E>
where
    V: Deserialize<'de>,
    E: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawAsyncValue::<V, E>::deserialize(deserializer)?;
        Ok(match raw.status {
            None | Some(Status::NotStarted) => Self::NotStarted,
            Some(Status::Loading) => Self::Loading,
            Some(Status::Loaded) => Self::Loaded(value_or_unit::<V, D::Error>(raw.value)?),
            Some(Status::Reloading) => Self::Reloading {
                value: value_or_unit::<V, D::Error>(raw.value)?,
                progress: raw.progress,
            },
            Some(Status::Failed) => Self::Failed(value_or_unit::<E, D::Error>(raw.error)?),
        })
    }
}

/// An absent `value` key is accepted when `T` can be built from unit, which
/// covers the `loaded(undefined)` case for `Option` payloads.
fn value_or_unit<'de, T, Err>(value: Option<T>) -> Result<T, Err>
where
    T: Deserialize<'de>,
    Err: serde::de::Error,
{
    match value {
        Some(value) => Ok(value),
        None => T::deserialize(().into_deserializer()),
    }
}
