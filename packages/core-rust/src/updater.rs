//! Pure, path-copying update of a single leaf in a value tree.

use crate::locator::Locator;
use crate::values::{ConfigValueMap, LeafValue, ValueEntry};

/// Returns a tree equal to `values` except that the leaf addressed by `locator`
/// holds `value`.
///
/// Entries off the path are shared with `values`, so callers can detect
/// unchanged subtrees by pointer. When the path does not exist (missing key,
/// wrong entry kind, or index out of bounds) the input is returned as-is; a
/// stale locator is not an error.
#[must_use]
pub fn update_value(values: &ConfigValueMap, locator: &Locator, value: LeafValue) -> ConfigValueMap {
    match locator {
        Locator::Single { config_field_id } => match values.get(config_field_id) {
            Some(ValueEntry::Single { .. }) => {
                values.with_entry(config_field_id.clone(), ValueEntry::Single { value })
            }
            _ => values.clone(),
        },
        Locator::ListOf {
            config_field_id,
            index,
            locator: inner,
        } => match values.get(config_field_id) {
            Some(ValueEntry::ListOf { list_of_values }) if *index < list_of_values.len() => {
                let mut list_of_values = list_of_values.clone();
                list_of_values[*index] = update_value(&list_of_values[*index], inner, value);
                values.with_entry(config_field_id.clone(), ValueEntry::ListOf { list_of_values })
            }
            _ => values.clone(),
        },
    }
}
