use crate::async_value::AsyncValue;
use crate::codec::default_value;
use crate::schema::{ConfigDefinition, FieldKind, FieldValueKind};
use crate::values::{ConfigValueMap, ValueEntry};

/// Seeds a value tree from the defaults declared in `definition`.
///
/// Input/output leaves become `Loaded(default)` (`Loaded(None)` when no default
/// is declared), event leaves are omitted, and repeated groups start empty.
#[must_use]
pub fn default_value_map(definition: &ConfigDefinition) -> ConfigValueMap {
    definition
        .fields()
        .filter_map(|field| {
            let entry = match &field.field {
                FieldKind::Single {
                    field_value: FieldValueKind::InputOutput { variable_type },
                    ..
                } => ValueEntry::Single {
                    value: AsyncValue::Loaded(default_value(variable_type)),
                },
                FieldKind::Single {
                    field_value: FieldValueKind::Event,
                    ..
                } => return None,
                FieldKind::ListOf { .. } => ValueEntry::ListOf {
                    list_of_values: Vec::new(),
                },
            };
            Some((field.field_id.clone(), entry))
        })
        .collect()
}
