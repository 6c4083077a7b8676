//! Resource state handle
//!
//! `ResourceData` carries the committed state of one resource instance and
//! the planned values for the operation in progress. Lifecycle operations
//! read the planned values, projectors write them, and the host commits them
//! once an operation succeeds.

use super::error::ProviderError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Flat field → value map as persisted by the host
pub type RawState = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    state: RawState,
    planned: RawState,
}

impl ResourceData {
    /// A resource that has never been persisted
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a resource from persisted state
    pub fn from_state(id: impl Into<String>, state: RawState) -> Self {
        Self {
            id: id.into(),
            planned: state.clone(),
            state,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// An empty id means the remote object does not exist (yet)
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.planned.get(field)
    }

    /// Set a planned value; `null` removes the field
    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        match value.into() {
            Value::Null => {
                self.planned.remove(field);
            }
            value => {
                self.planned.insert(field.to_string(), value);
            }
        }
    }

    pub fn remove(&mut self, field: &str) {
        self.planned.remove(field);
    }

    /// Whether the planned value differs from the committed one
    pub fn has_change(&self, field: &str) -> bool {
        self.state.get(field) != self.planned.get(field)
    }

    /// Fields whose planned value differs from the committed one, sorted
    pub fn changed_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .state
            .keys()
            .chain(self.planned.keys())
            .filter(|field| self.has_change(field))
            .cloned()
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Make the planned values the committed state
    pub fn commit(&mut self) {
        self.state = self.planned.clone();
    }

    /// Committed state
    pub fn state(&self) -> &RawState {
        &self.state
    }

    /// Planned values
    pub fn planned(&self) -> &RawState {
        &self.planned
    }

    // =========================================================================
    // Typed getters
    // =========================================================================

    /// String value; an absent field reads as the empty string
    pub fn get_string(&self, field: &str) -> Result<String, ProviderError> {
        Ok(self.get_optional_string(field)?.unwrap_or_default())
    }

    pub fn get_optional_string(&self, field: &str) -> Result<Option<String>, ProviderError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(unexpected(field, "string", other)),
        }
    }

    pub fn get_i64(&self, field: &str) -> Result<i64, ProviderError> {
        value_as_i64(field, self.get(field))
    }

    pub fn get_f64(&self, field: &str) -> Result<f64, ProviderError> {
        value_as_f64(field, self.get(field))
    }

    /// List of strings; an absent field reads as an empty list
    pub fn get_string_list(&self, field: &str) -> Result<Vec<String>, ProviderError> {
        value_as_string_list(field, self.get(field))
    }

    /// Map of strings; an absent field reads as an empty map
    pub fn get_string_map(&self, field: &str) -> Result<BTreeMap<String, String>, ProviderError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(BTreeMap::new()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(key, value)| match value {
                    Value::String(s) => Ok((key.clone(), s.clone())),
                    other => Err(unexpected(&format!("{}.{}", field, key), "string", other)),
                })
                .collect(),
            Some(other) => Err(unexpected(field, "map of strings", other)),
        }
    }

    /// Nested block stored as a single-element list
    pub fn get_block(&self, field: &str) -> Result<Option<&RawState>, ProviderError> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => match items.as_slice() {
                [] => Ok(None),
                [Value::Object(block)] => Ok(Some(block)),
                [other] => Err(unexpected(field, "block", other)),
                _ => Err(ProviderError::schema(
                    field,
                    format!("expected at most one block, found {}", items.len()),
                )),
            },
            Some(other) => Err(unexpected(field, "list of blocks", other)),
        }
    }

    /// Store a nested block as a single-element list
    pub fn set_block(&mut self, field: &str, block: RawState) {
        self.set(field, Value::Array(vec![Value::Object(block)]));
    }
}

// =============================================================================
// Value helpers shared with nested blocks
// =============================================================================

pub(crate) fn value_as_i64(field: &str, value: Option<&Value>) -> Result<i64, ProviderError> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| ProviderError::schema(field, format!("{} is not an integer", n))),
        Some(other) => Err(unexpected(field, "integer", other)),
    }
}

pub(crate) fn value_as_f64(field: &str, value: Option<&Value>) -> Result<f64, ProviderError> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ProviderError::schema(field, format!("{} is not a float", n))),
        Some(other) => Err(unexpected(field, "float", other)),
    }
}

pub(crate) fn value_as_string(field: &str, value: Option<&Value>) -> Result<Option<String>, ProviderError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(unexpected(field, "string", other)),
    }
}

pub(crate) fn value_as_string_list(
    field: &str,
    value: Option<&Value>,
) -> Result<Vec<String>, ProviderError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(unexpected(field, "list of strings", other)),
            })
            .collect(),
        Some(other) => Err(unexpected(field, "list of strings", other)),
    }
}

fn unexpected(field: &str, expected: &str, actual: &Value) -> ProviderError {
    ProviderError::schema(field, format!("expected {}, found {}", expected, actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawState {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_new_resource_is_unpersisted() {
        let data = ResourceData::new();
        assert!(!data.is_persisted());
        assert_eq!(data.id(), "");
    }

    #[test]
    fn test_has_change_against_committed_state() {
        let mut data = ResourceData::from_state("ch-1", raw(json!({"name": "alpha"})));
        assert!(!data.has_change("name"));

        data.set("name", "beta");
        assert!(data.has_change("name"));
        assert_eq!(data.changed_fields(), vec!["name".to_string()]);

        data.commit();
        assert!(!data.has_change("name"));
    }

    #[test]
    fn test_first_apply_counts_as_change() {
        let mut data = ResourceData::new();
        data.set("name", "alpha");
        assert!(data.has_change("name"));
        assert!(!data.has_change("full_name"));
    }

    #[test]
    fn test_setting_null_removes_field() {
        let mut data = ResourceData::from_state("x", raw(json!({"channel": "#ops"})));
        data.set("channel", None::<String>);
        assert!(data.get("channel").is_none());
        assert!(data.has_change("channel"));
    }

    #[test]
    fn test_typed_getters() {
        let data = ResourceData::from_state(
            "x",
            raw(json!({
                "name": "alpha",
                "emails": ["a@x", "b@x"],
                "headers": {"k": "v"},
                "ts": 12,
                "threshold": 1.5,
                "block": [{"a": "b"}]
            })),
        );

        assert_eq!(data.get_string("name").unwrap(), "alpha");
        assert_eq!(data.get_string("missing").unwrap(), "");
        assert_eq!(data.get_optional_string("missing").unwrap(), None);
        assert_eq!(data.get_string_list("emails").unwrap(), vec!["a@x", "b@x"]);
        assert_eq!(data.get_string_map("headers").unwrap()["k"], "v");
        assert_eq!(data.get_i64("ts").unwrap(), 12);
        assert_eq!(data.get_f64("ts").unwrap(), 12.0);
        assert_eq!(data.get_f64("threshold").unwrap(), 1.5);
        assert_eq!(data.get_block("block").unwrap().unwrap()["a"], "b");
    }

    #[test]
    fn test_wrong_shape_is_schema_error() {
        let data = ResourceData::from_state("x", raw(json!({"emails": "a@x", "name": 3})));
        assert!(matches!(
            data.get_string_list("emails"),
            Err(ProviderError::Schema { ref field, .. }) if field == "emails"
        ));
        assert!(matches!(
            data.get_string("name"),
            Err(ProviderError::Schema { .. })
        ));
    }

    #[test]
    fn test_block_with_multiple_items_is_rejected() {
        let data = ResourceData::from_state("x", raw(json!({"block": [{}, {}]})));
        assert!(data.get_block("block").is_err());
    }
}
