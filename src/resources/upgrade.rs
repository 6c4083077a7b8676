//! State upgraders shared by several resource types

use crate::resource::formatter::{LEGACY_MANAGED_NAME_SUFFIX, MANAGED_NAME_SUFFIX};
use crate::resource::naming::{FULL_NAME_FIELD, NAME_FIELD};
use crate::resource::RawState;
use serde_json::Value;

/// Strip exactly one trailing managed suffix, current or legacy
pub fn strip_managed_suffix(name: &str) -> &str {
    name.strip_suffix(MANAGED_NAME_SUFFIX)
        .or_else(|| name.strip_suffix(LEGACY_MANAGED_NAME_SUFFIX))
        .unwrap_or(name)
}

/// 0 → 1: version 0 kept the transmitted name in `name` and had no
/// `full_name`. Moves it to `full_name` and keeps the undecorated form in
/// `name`. States that already carry `full_name` are returned unchanged.
pub fn full_name_from_name(mut state: RawState) -> Result<RawState, String> {
    if state.contains_key(FULL_NAME_FIELD) {
        return Ok(state);
    }

    let name = match state.get(NAME_FIELD) {
        None | Some(Value::Null) => return Ok(state),
        Some(Value::String(name)) => name.clone(),
        Some(other) => return Err(format!("expected name to be a string, found {}", other)),
    };

    state.insert(
        NAME_FIELD.to_string(),
        Value::String(strip_managed_suffix(&name).to_string()),
    );
    state.insert(FULL_NAME_FIELD.to_string(), Value::String(name));
    Ok(state)
}
