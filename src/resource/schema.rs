//! Schema descriptors and plan-time validation
//!
//! A [`Schema`] describes the fields of one resource type. User
//! configuration is checked against it before any REST call is made, and
//! accepted values are written into the planned state in normalised form so
//! that a no-op re-apply produces no diff.

use super::data::{RawState, ResourceData};
use super::error::ProviderError;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// Ordered list of scalars
    List(Box<FieldType>),
    /// Unordered collection of scalars, stored sorted and de-duplicated
    Set(Box<FieldType>),
    /// Map from string to string
    Map,
    /// Nested block, stored as a list of objects
    Block(Schema),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Written by the provider only
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedValues {
    pub values: &'static [&'static str],
    pub ignore_case: bool,
}

impl AllowedValues {
    /// The canonical spelling of `value`, if it is allowed
    fn canonical(&self, value: &str) -> Option<&'static str> {
        self.values.iter().copied().find(|allowed| {
            if self.ignore_case {
                allowed.eq_ignore_ascii_case(value)
            } else {
                *allowed == value
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub field_type: FieldType,
    pub presence: Presence,
    pub default: Option<Value>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    /// Inclusive bounds on the number of characters
    pub length: Option<(usize, usize)>,
    pub allowed_values: Option<AllowedValues>,
    pub conflicts_with: Vec<&'static str>,
    pub sensitive: bool,
    pub description: &'static str,
}

impl FieldSchema {
    fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            presence: Presence::Optional,
            default: None,
            min_items: None,
            max_items: None,
            length: None,
            allowed_values: None,
            conflicts_with: Vec::new(),
            sensitive: false,
            description: "",
        }
    }

    pub fn string() -> Self {
        Self::of(FieldType::String)
    }

    pub fn int() -> Self {
        Self::of(FieldType::Int)
    }

    pub fn float() -> Self {
        Self::of(FieldType::Float)
    }

    pub fn bool() -> Self {
        Self::of(FieldType::Bool)
    }

    pub fn string_list() -> Self {
        Self::of(FieldType::List(Box::new(FieldType::String)))
    }

    pub fn string_set() -> Self {
        Self::of(FieldType::Set(Box::new(FieldType::String)))
    }

    pub fn string_map() -> Self {
        Self::of(FieldType::Map)
    }

    pub fn block(schema: Schema) -> Self {
        Self::of(FieldType::Block(schema))
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.length = Some((min, max));
        self
    }

    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed_values = Some(AllowedValues {
            values,
            ignore_case: false,
        });
        self
    }

    pub fn one_of_ignore_case(mut self, values: &'static [&'static str]) -> Self {
        self.allowed_values = Some(AllowedValues {
            values,
            ignore_case: true,
        });
        self
    }

    pub fn conflicts_with(mut self, fields: &[&'static str]) -> Self {
        self.conflicts_with.extend_from_slice(fields);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Field name → descriptor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: BTreeMap<&'static str, FieldSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, field: FieldSchema) -> Self {
        self.fields.insert(name, field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldSchema)> {
        self.fields.iter().map(|(name, field)| (*name, field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check a user configuration; returns one diagnostic per violation
    pub fn validate(&self, config: &RawState) -> Vec<String> {
        let mut diagnostics = Vec::new();
        self.validate_object("", config, &mut diagnostics);
        diagnostics
    }

    /// Validate `config` and write the accepted values into the planned
    /// state of `data`. Computed fields keep their current values. Nothing
    /// is written when validation fails.
    pub fn plan(
        &self,
        resource: &str,
        data: &mut ResourceData,
        config: &RawState,
    ) -> Result<(), ProviderError> {
        let diagnostics = self.validate(config);
        if !diagnostics.is_empty() {
            return Err(ProviderError::InvalidConfig {
                resource: resource.to_string(),
                diagnostics,
            });
        }

        for (name, field) in self.iter() {
            if field.presence == Presence::Computed {
                continue;
            }
            match config.get(name).filter(|value| !value.is_null()) {
                Some(value) => data.set(name, normalize(field, value)),
                None => match &field.default {
                    Some(default) => data.set(name, normalize(field, default)),
                    None => data.remove(name),
                },
            }
        }
        Ok(())
    }

    fn validate_object(&self, path: &str, config: &RawState, diagnostics: &mut Vec<String>) {
        for key in config.keys() {
            if !self.fields.contains_key(key.as_str()) {
                diagnostics.push(format!("{}{}: unsupported argument", path, key));
            }
        }

        let mut reported_conflicts = BTreeSet::new();

        for (name, field) in self.iter() {
            let field_path = format!("{}{}", path, name);
            let value = config.get(name).filter(|value| !value.is_null());

            match (field.presence, value) {
                (Presence::Computed, Some(_)) => {
                    diagnostics.push(format!("{}: computed attribute cannot be set", field_path));
                    continue;
                }
                (Presence::Required, None) => {
                    diagnostics.push(format!("{}: required argument is missing", field_path));
                    continue;
                }
                (_, None) => continue,
                (_, Some(value)) => check_value(&field_path, field, value, diagnostics),
            }

            if !value.map(is_set).unwrap_or(false) {
                continue;
            }
            for other in &field.conflicts_with {
                let other_set = config.get(*other).map(is_set).unwrap_or(false);
                let pair = if name < *other { (name, *other) } else { (*other, name) };
                if other_set && reported_conflicts.insert(pair) {
                    diagnostics.push(format!(
                        "{}{}: conflicts with {}{}",
                        path, pair.0, path, pair.1
                    ));
                }
            }
        }
    }
}

/// A value counts as set when it is neither null nor an empty collection
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn check_value(path: &str, field: &FieldSchema, value: &Value, diagnostics: &mut Vec<String>) {
    match &field.field_type {
        FieldType::List(inner) | FieldType::Set(inner) => {
            let Some(items) = value.as_array() else {
                diagnostics.push(format!("{}: expected a list", path));
                return;
            };
            check_item_count(path, field, items.len(), diagnostics);
            for (index, item) in items.iter().enumerate() {
                check_scalar(&format!("{}.{}", path, index), inner, field, item, diagnostics);
            }
        }
        FieldType::Map => {
            let Some(map) = value.as_object() else {
                diagnostics.push(format!("{}: expected a map", path));
                return;
            };
            for (key, item) in map {
                if !item.is_string() {
                    diagnostics.push(format!("{}.{}: expected a string", path, key));
                }
            }
        }
        FieldType::Block(schema) => {
            let Some(items) = value.as_array() else {
                diagnostics.push(format!("{}: expected a list of blocks", path));
                return;
            };
            check_item_count(path, field, items.len(), diagnostics);
            for (index, item) in items.iter().enumerate() {
                match item.as_object() {
                    Some(block) => {
                        schema.validate_object(&format!("{}.{}.", path, index), block, diagnostics)
                    }
                    None => diagnostics.push(format!("{}.{}: expected a block", path, index)),
                }
            }
        }
        scalar => check_scalar(path, scalar, field, value, diagnostics),
    }
}

fn check_item_count(path: &str, field: &FieldSchema, count: usize, diagnostics: &mut Vec<String>) {
    if let Some(min) = field.min_items {
        if count < min {
            diagnostics.push(format!(
                "{}: attribute requires {} item minimum, but config has only {} declared",
                path, min, count
            ));
        }
    }
    if let Some(max) = field.max_items {
        if count > max {
            diagnostics.push(format!(
                "{}: no more than {} items are allowed, but config has {} declared",
                path, max, count
            ));
        }
    }
}

fn check_scalar(
    path: &str,
    field_type: &FieldType,
    field: &FieldSchema,
    value: &Value,
    diagnostics: &mut Vec<String>,
) {
    match field_type {
        FieldType::String => {
            let Some(s) = value.as_str() else {
                diagnostics.push(format!("{}: expected a string", path));
                return;
            };
            if let Some((min, max)) = field.length {
                let len = s.chars().count();
                if len < min || len > max {
                    diagnostics.push(format!(
                        "{}: expected length to be in the range ({} - {}), got {}",
                        path, min, max, len
                    ));
                }
            }
            if let Some(allowed) = &field.allowed_values {
                if allowed.canonical(s).is_none() {
                    diagnostics.push(format!(
                        "{}: expected to be one of [{}], got {}",
                        path,
                        allowed.values.join(", "),
                        s
                    ));
                }
            }
        }
        FieldType::Int => {
            if value.as_i64().is_none() {
                diagnostics.push(format!("{}: expected an integer", path));
            }
        }
        FieldType::Float => {
            if !value.is_number() {
                diagnostics.push(format!("{}: expected a number", path));
            }
        }
        FieldType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(format!("{}: expected a bool", path));
            }
        }
        _ => diagnostics.push(format!("{}: nested collections are not supported", path)),
    }
}

/// Bring an accepted value into the form projectors write back
fn normalize(field: &FieldSchema, value: &Value) -> Value {
    match (&field.field_type, value) {
        (FieldType::List(inner), Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| normalize_scalar(inner, field, item))
                .collect(),
        ),
        (FieldType::Set(inner), Value::Array(items)) => {
            let mut items: Vec<Value> = items
                .iter()
                .map(|item| normalize_scalar(inner, field, item))
                .collect();
            sort_values(&mut items);
            Value::Array(items)
        }
        (FieldType::Block(schema), Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(block) => Value::Object(normalize_block(schema, block)),
                    other => other.clone(),
                })
                .collect(),
        ),
        (scalar, value) => normalize_scalar(scalar, field, value),
    }
}

fn normalize_block(schema: &Schema, block: &RawState) -> RawState {
    let mut normalized = RawState::new();
    for (name, field) in schema.iter() {
        let value = block
            .get(name)
            .filter(|value| !value.is_null())
            .or(field.default.as_ref());
        if let Some(value) = value {
            normalized.insert(name.to_string(), normalize(field, value));
        }
    }
    normalized
}

fn normalize_scalar(field_type: &FieldType, field: &FieldSchema, value: &Value) -> Value {
    match (field_type, value) {
        (FieldType::Float, Value::Number(n)) => {
            n.as_f64().map(Value::from).unwrap_or_else(|| value.clone())
        }
        (FieldType::String, Value::String(s)) => match field.allowed_values {
            Some(allowed) => Value::String(allowed.canonical(s).unwrap_or(s.as_str()).to_string()),
            None => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Sort and de-duplicate, the storage form of sets. Strings order by content,
/// the same order projectors produce.
pub(crate) fn sort_values(items: &mut Vec<Value>) {
    items.sort_by_key(|item| match item {
        Value::String(s) => (0, s.clone()),
        other => (1, other.to_string()),
    });
    items.dedup();
}
