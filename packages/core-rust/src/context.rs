//! Context projection: turns a schema and a value snapshot into per-field
//! capabilities for local code.
//!
//! Every field of the schema becomes one [`ContextField`], in declaration
//! order:
//!
//! - event leaves become an [`EventTrigger`],
//! - input/output leaves become a [`ValueField`] exposing the current value
//!   and four setters,
//! - repeated groups become one nested [`WidgetContext`] per element.
//!
//! Projection itself is side-effect free. Only the setters and triggers it
//! hands out write, and they write exclusively through the [`ValueSink`]
//! given to [`project`]. The capabilities hold a locator, never a tree or a
//! host link: both are resolved by the sink when the write happens.

use std::fmt;
use std::sync::Arc;

use crate::async_value::AsyncValue;
use crate::codec::{to_storage, to_wire};
use crate::locator::Locator;
use crate::messages::PointerPayload;
use crate::schema::{ConfigDefinition, FieldKind, FieldValueKind, VariableType};
use crate::traits::{LocalWrite, ValueSink};
use crate::types::LocalValue;
use crate::values::{ConfigValueMap, LeafValue, WireValue};

#[derive(Clone)]
struct Sink(Arc<dyn ValueSink>);

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sink(..)")
    }
}

/// The projected context: one capability per schema field, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct WidgetContext {
    fields: Vec<(String, ContextField)>,
}

#[derive(Debug, Clone)]
pub enum ContextField {
    Event(EventTrigger),
    Value(ValueField),
    List(Vec<WidgetContext>),
}

impl WidgetContext {
    #[must_use]
    pub fn get(&self, field_id: &str) -> Option<&ContextField> {
        self.fields
            .iter()
            .find(|(id, _)| id == field_id)
            .map(|(_, field)| field)
    }

    #[must_use]
    pub fn event(&self, field_id: &str) -> Option<&EventTrigger> {
        match self.get(field_id)? {
            ContextField::Event(trigger) => Some(trigger),
            _ => None,
        }
    }

    #[must_use]
    pub fn value(&self, field_id: &str) -> Option<&ValueField> {
        match self.get(field_id)? {
            ContextField::Value(field) => Some(field),
            _ => None,
        }
    }

    #[must_use]
    pub fn list(&self, field_id: &str) -> Option<&[WidgetContext]> {
        match self.get(field_id)? {
            ContextField::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextField)> {
        self.fields.iter().map(|(id, field)| (id.as_str(), field))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Capability for an event leaf.
#[derive(Debug, Clone)]
pub struct EventTrigger {
    locator: Locator,
    sink: Sink,
}

impl EventTrigger {
    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Fires the event on the host. Pass the pointer payload when triggered
    /// by a click so the host can honour modifier keys. Without a host link
    /// this does nothing.
    pub fn trigger(&self, pointer: Option<PointerPayload>) {
        self.sink.0.submit(LocalWrite::Event {
            locator: self.locator.clone(),
            pointer,
        });
    }
}

/// Capability for an input/output leaf: its current value and its setters.
///
/// Every setter updates the local value tree through the sink and, when a
/// host link exists, notifies the host with the wire form of the value.
#[derive(Debug, Clone)]
pub struct ValueField {
    locator: Locator,
    variable_type: VariableType,
    value: LeafValue,
    sink: Sink,
}

impl ValueField {
    /// Value at projection time.
    #[must_use]
    pub fn value(&self) -> &LeafValue {
        &self.value
    }

    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    #[must_use]
    pub fn variable_type(&self) -> &VariableType {
        &self.variable_type
    }

    pub fn set_loading(&self) {
        self.publish(AsyncValue::Loading, Some(AsyncValue::Loading));
    }

    pub fn set_loaded(&self, value: Option<LocalValue>) {
        let stored = to_storage(&self.variable_type, value.as_ref());
        let wire = to_wire(&self.variable_type, value.as_ref());
        self.publish(AsyncValue::Loaded(stored), wire.map(AsyncValue::Loaded));
    }

    pub fn set_reloading(&self, value: Option<LocalValue>, progress: Option<f64>) {
        let stored = to_storage(&self.variable_type, value.as_ref());
        let wire = to_wire(&self.variable_type, value.as_ref());
        self.publish(
            AsyncValue::Reloading {
                value: stored,
                progress,
            },
            wire.map(|value| AsyncValue::Reloading { value, progress }),
        );
    }

    pub fn set_failed(&self, error: impl Into<String>) {
        let error = error.into();
        self.publish(
            AsyncValue::Failed(error.clone()),
            Some(AsyncValue::Failed(error)),
        );
    }

    fn publish(&self, value: LeafValue, wire: Option<AsyncValue<WireValue>>) {
        self.sink.0.submit(LocalWrite::Value {
            locator: self.locator.clone(),
            value,
            wire,
        });
    }
}

/// Projects `definition` against `values`; every capability writes to `sink`.
#[must_use]
pub fn project(
    definition: &ConfigDefinition,
    values: &ConfigValueMap,
    sink: Arc<dyn ValueSink>,
) -> WidgetContext {
    project_within(definition, values, &Sink(sink), &|locator| locator)
}

/// Projects a nested schema; `prefix` wraps every locator built at this level
/// with the path of the enclosing repeated-group elements.
fn project_within(
    definition: &ConfigDefinition,
    values: &ConfigValueMap,
    sink: &Sink,
    prefix: &dyn Fn(Locator) -> Locator,
) -> WidgetContext {
    let fields = definition
        .fields()
        .map(|field| {
            let field_id = field.field_id.as_str();
            let projected = match &field.field {
                FieldKind::Single { field_value, .. } => {
                    let locator = prefix(Locator::single(field_id));
                    match field_value {
                        FieldValueKind::Event => ContextField::Event(EventTrigger {
                            locator,
                            sink: sink.clone(),
                        }),
                        FieldValueKind::InputOutput { variable_type } => {
                            ContextField::Value(ValueField {
                                locator,
                                variable_type: variable_type.clone(),
                                value: values.single(field_id).cloned().unwrap_or_default(),
                                sink: sink.clone(),
                            })
                        }
                    }
                }
                FieldKind::ListOf { config, .. } => {
                    let elements = values.list_of(field_id).unwrap_or_default();
                    ContextField::List(
                        elements
                            .iter()
                            .enumerate()
                            .map(|(index, element)| {
                                let nested =
                                    |inner: Locator| prefix(Locator::list_of(field_id, index, inner));
                                project_within(config, element, sink, &nested)
                            })
                            .collect(),
                    )
                }
            };
            (field.field_id.clone(), projected)
        })
        .collect();

    WidgetContext { fields }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::defaults::default_value_map;
    use crate::messages::MessageToHost;
    use crate::schema::ConfigField;
    use crate::types::{ObjectRef, PrimaryKey};
    use crate::updater::update_value;
    use crate::values::{
        ObjectRids, ObjectSetLocators, ScalarValue, ValueEntry, VariableValue, WireScalar,
    };

    /// In-memory sink: applies writes to its own tree and records host messages.
    #[derive(Default)]
    struct Recorder {
        link_id: Mutex<Option<String>>,
        values: Mutex<ConfigValueMap>,
        applied: Mutex<Vec<(Locator, LeafValue)>>,
        sent: Mutex<Vec<MessageToHost>>,
    }

    impl Recorder {
        fn new(values: ConfigValueMap, link_id: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                link_id: Mutex::new(link_id.map(String::from)),
                values: Mutex::new(values),
                ..Self::default()
            })
        }

        fn sent(&self) -> Vec<MessageToHost> {
            self.sent.lock().expect("lock").clone()
        }
    }

    impl ValueSink for Recorder {
        fn submit(&self, write: LocalWrite) {
            let link_id = self.link_id.lock().expect("lock").clone();
            if let Some(message) = write.to_host(link_id.as_deref()) {
                self.sent.lock().expect("lock").push(message);
            }
            if let LocalWrite::Value { locator, value, .. } = write {
                let mut values = self.values.lock().expect("lock");
                *values = update_value(&values, &locator, value.clone());
                self.applied.lock().expect("lock").push((locator, value));
            }
        }
    }

    fn list_schema() -> ConfigDefinition {
        ConfigDefinition::new(vec![ConfigField::list_of(
            "field",
            "Field",
            ConfigDefinition::new(vec![
                ConfigField::input_output("text", "Text", VariableType::String { default_value: None }),
                ConfigField::event("eventId", "Event"),
            ]),
        )])
    }

    fn list_values(elements: usize) -> ConfigValueMap {
        let element: ConfigValueMap = [(
            "text".to_string(),
            ValueEntry::Single {
                value: AsyncValue::Loaded(None),
            },
        )]
        .into_iter()
        .collect();
        [(
            "field".to_string(),
            ValueEntry::ListOf {
                list_of_values: vec![element; elements],
            },
        )]
        .into_iter()
        .collect()
    }

    fn people_schema() -> ConfigDefinition {
        ConfigDefinition::new(vec![ConfigField::input_output(
            "people",
            "People",
            VariableType::ObjectSet {
                object_type_id: "person".into(),
                default_value: None,
            },
        )])
    }

    #[test]
    fn list_elements_get_prefixed_locators() {
        let recorder = Recorder::new(list_values(2), Some("w1"));
        let context = project(&list_schema(), &list_values(2), recorder.clone());

        let items = context.list("field").expect("list field");
        assert_eq!(items.len(), 2);

        items[0].event("eventId").expect("event").trigger(None);
        assert_eq!(
            recorder.sent(),
            vec![MessageToHost::ExecuteEvent {
                link_id: "w1".into(),
                locator: Locator::list_of("field", 0, Locator::single("eventId")),
                pointer: None,
            }]
        );
        assert_eq!(
            items[1].value("text").expect("value").locator(),
            &Locator::list_of("field", 1, Locator::single("text"))
        );
    }

    #[test]
    fn doubly_nested_locators_compose_outermost_first() {
        let inner = ConfigDefinition::new(vec![ConfigField::event("leaf", "Leaf")]);
        let schema = ConfigDefinition::new(vec![ConfigField::list_of(
            "outer",
            "Outer",
            ConfigDefinition::new(vec![ConfigField::list_of("inner", "Inner", inner)]),
        )]);
        let inner_values: ConfigValueMap = [(
            "inner".to_string(),
            ValueEntry::ListOf {
                list_of_values: vec![ConfigValueMap::new(), ConfigValueMap::new()],
            },
        )]
        .into_iter()
        .collect();
        let values: ConfigValueMap = [(
            "outer".to_string(),
            ValueEntry::ListOf {
                list_of_values: vec![ConfigValueMap::new(), inner_values],
            },
        )]
        .into_iter()
        .collect();

        let context = project(&schema, &values, Recorder::new(values.clone(), None));
        let leaf = context.list("outer").expect("outer")[1]
            .list("inner")
            .expect("inner")[1]
            .event("leaf")
            .expect("leaf");
        assert_eq!(
            leaf.locator(),
            &Locator::list_of("outer", 1, Locator::list_of("inner", 1, Locator::single("leaf")))
        );
        assert!(context.list("outer").expect("outer")[0]
            .list("inner")
            .expect("inner")
            .is_empty());
    }

    #[test]
    fn missing_values_project_as_not_started_and_empty_lists() {
        let schema = ConfigDefinition::new(vec![
            ConfigField::input_output("n", "N", VariableType::Number { default_value: None }),
            ConfigField::list_of("rows", "Rows", ConfigDefinition::default()),
        ]);
        let context = project(
            &schema,
            &ConfigValueMap::new(),
            Recorder::new(ConfigValueMap::new(), None),
        );
        assert!(context.value("n").expect("n").value().is_not_started());
        assert_eq!(context.list("rows").map(<[_]>::len), Some(0));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn setters_apply_locally_and_notify_host() {
        let values = default_value_map(&people_schema());
        let recorder = Recorder::new(values.clone(), Some("w1"));
        let context = project(&people_schema(), &values, recorder.clone());
        let field = context.value("people").expect("people");

        field.set_loaded(Some(LocalValue::Objects(vec![ObjectRef::new(
            "ri.p.1",
            PrimaryKey::String("alice".into()),
        )])));

        assert_eq!(
            recorder.values.lock().expect("lock").single("people"),
            Some(&AsyncValue::Loaded(Some(VariableValue::Scalar(ScalarValue::ObjectSet(
                ObjectSetLocators::String {
                    primary_keys: vec!["alice".into()]
                }
            )))))
        );
        assert_eq!(
            recorder.sent(),
            vec![MessageToHost::SetValue {
                link_id: "w1".into(),
                locator: Locator::single("people"),
                value: Some(AsyncValue::Loaded(WireValue::Scalar(WireScalar::ObjectRids(
                    ObjectRids {
                        object_rids: vec!["ri.p.1".into()]
                    }
                )))),
            }]
        );
    }

    #[test]
    fn mixed_primary_keys_store_nothing_but_still_send_rids() {
        let values = default_value_map(&people_schema());
        let recorder = Recorder::new(values.clone(), Some("w1"));
        let context = project(&people_schema(), &values, recorder.clone());

        context.value("people").expect("people").set_loaded(Some(LocalValue::Objects(vec![
            ObjectRef::new("ri.p.1", PrimaryKey::String("alice".into())),
            ObjectRef::new("ri.p.2", PrimaryKey::Number(7.0)),
        ])));

        assert_eq!(
            recorder.values.lock().expect("lock").single("people"),
            Some(&AsyncValue::Loaded(None))
        );
        assert_eq!(
            recorder.sent(),
            vec![MessageToHost::SetValue {
                link_id: "w1".into(),
                locator: Locator::single("people"),
                value: Some(AsyncValue::Loaded(WireValue::Scalar(WireScalar::ObjectRids(
                    ObjectRids {
                        object_rids: vec!["ri.p.1".into(), "ri.p.2".into()]
                    }
                )))),
            }]
        );
    }

    #[test]
    fn every_setter_reaches_the_sink() {
        let schema = ConfigDefinition::new(vec![ConfigField::input_output(
            "n",
            "N",
            VariableType::Number { default_value: None },
        )]);
        let values = default_value_map(&schema);
        let recorder = Recorder::new(values.clone(), Some("w"));
        let context = project(&schema, &values, recorder.clone());
        let field = context.value("n").expect("n");

        field.set_loading();
        field.set_reloading(Some(LocalValue::Number(2.0)), Some(50.0));
        field.set_failed("nope");
        field.set_loaded(None);

        let applied: Vec<LeafValue> = recorder
            .applied
            .lock()
            .expect("lock")
            .iter()
            .map(|(_, v)| v.clone())
            .collect();
        assert_eq!(
            applied,
            vec![
                AsyncValue::Loading,
                AsyncValue::Reloading {
                    value: Some(VariableValue::Scalar(ScalarValue::Number(2.0))),
                    progress: Some(50.0)
                },
                AsyncValue::Failed("nope".into()),
                AsyncValue::Loaded(None),
            ]
        );

        let set = |value| MessageToHost::SetValue {
            link_id: "w".into(),
            locator: Locator::single("n"),
            value,
        };
        assert_eq!(
            recorder.sent(),
            vec![
                set(Some(AsyncValue::Loading)),
                set(Some(AsyncValue::Reloading {
                    value: WireValue::Scalar(WireScalar::Number(2.0)),
                    progress: Some(50.0),
                })),
                set(Some(AsyncValue::Failed("nope".into()))),
                // An absent loaded value goes out without an async wrapper.
                set(None),
            ]
        );
    }

    #[test]
    fn without_link_only_local_effects_happen() {
        let schema = ConfigDefinition::new(vec![
            ConfigField::input_output("s", "S", VariableType::String { default_value: None }),
            ConfigField::event("go", "Go"),
        ]);
        let values = default_value_map(&schema);
        let recorder = Recorder::new(values.clone(), None);
        let context = project(&schema, &values, recorder.clone());

        context
            .value("s")
            .expect("s")
            .set_loaded(Some(LocalValue::from("hi")));
        context.event("go").expect("go").trigger(None);

        assert!(recorder.sent().is_empty());
        assert_eq!(
            recorder.values.lock().expect("lock").single("s"),
            Some(&AsyncValue::Loaded(Some(VariableValue::Scalar(ScalarValue::String(
                "hi".into()
            )))))
        );
    }

    #[test]
    fn link_is_resolved_when_the_capability_fires() {
        let schema = ConfigDefinition::new(vec![ConfigField::event("go", "Go")]);
        let recorder = Recorder::new(ConfigValueMap::new(), Some("old"));
        let context = project(&schema, &ConfigValueMap::new(), recorder.clone());

        *recorder.link_id.lock().expect("lock") = Some("new".into());
        context.event("go").expect("go").trigger(None);

        assert_eq!(
            recorder.sent(),
            vec![MessageToHost::ExecuteEvent {
                link_id: "new".into(),
                locator: Locator::single("go"),
                pointer: None,
            }]
        );
    }
}
