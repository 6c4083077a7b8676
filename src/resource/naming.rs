//! Name derivation
//!
//! Binds the user-authored `name` to the transmitted `full_name`. The
//! decorated name is only recomputed when `name` itself changes, so a
//! no-op apply sends the stored `full_name` again and decoration happens
//! exactly once per rename.
//!
//! A `full_name` edited by hand is trusted as is until `name` changes.

use super::data::ResourceData;
use super::error::ProviderError;
use super::formatter::ResourceNameFormatter;

/// User-authored, undecorated name
pub const NAME_FIELD: &str = "name";

/// Decorated name as sent to and returned by Instana
pub const FULL_NAME_FIELD: &str = "full_name";

/// The name to transmit for the planned state of `data`
pub fn compute_full_name(
    data: &ResourceData,
    formatter: &ResourceNameFormatter,
) -> Result<String, ProviderError> {
    if data.has_change(NAME_FIELD) {
        Ok(formatter.format(&data.get_string(NAME_FIELD)?))
    } else {
        data.get_string(FULL_NAME_FIELD)
    }
}

/// The user-facing name for a transmitted one
pub fn display_name(full_name: &str, formatter: &ResourceNameFormatter) -> String {
    formatter.undo_format(full_name)
}
