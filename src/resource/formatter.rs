//! Name decoration
//!
//! Names of managed objects are decorated before they are sent to Instana so
//! that operators can tell them apart in the UI. Decoration is undone when a
//! name is shown back to the user.
//!
//! `undo_format(format(s)) == s` for every formatter and every `s`. Decoration
//! is not idempotent on its own (`format(format(s)) != format(s)`); see
//! [`super::naming`] for how repeated applies avoid decorating twice.

/// Suffix appended by the current schema versions
pub const MANAGED_NAME_SUFFIX: &str = " (TF managed)";

/// Suffix written by releases before schema version 1. Only state upgraders
/// recognise it; it does not undo with [`MANAGED_NAME_SUFFIX`].
pub const LEGACY_MANAGED_NAME_SUFFIX: &str = " (tf managed)";

/// Suffix configured when the operator does not choose one
pub const DEFAULT_NAME_SUFFIX: &str = "(TF managed)";

pub const MANAGED_DESCRIPTION_SUFFIX: &str =
    "\n\nThis resource is managed by Terraform. Manual changes will be overwritten.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceNameFormatter {
    /// Names are sent as written
    PassThrough,
    /// Names are sent as `prefix + name + suffix`
    Decorating { prefix: String, suffix: String },
}

impl Default for ResourceNameFormatter {
    fn default() -> Self {
        Self::Decorating {
            prefix: String::new(),
            suffix: MANAGED_NAME_SUFFIX.to_string(),
        }
    }
}

impl ResourceNameFormatter {
    /// Build a formatter from the provider's `default_name_prefix` and
    /// `default_name_suffix`. Non-empty parts are separated from the name by
    /// a single space; both empty selects pass-through.
    pub fn from_prefix_and_suffix(prefix: &str, suffix: &str) -> Self {
        let prefix = prefix.trim();
        let suffix = suffix.trim();

        if prefix.is_empty() && suffix.is_empty() {
            return Self::PassThrough;
        }

        Self::Decorating {
            prefix: if prefix.is_empty() {
                String::new()
            } else {
                format!("{} ", prefix)
            },
            suffix: if suffix.is_empty() {
                String::new()
            } else {
                format!(" {}", suffix)
            },
        }
    }

    pub fn format(&self, name: &str) -> String {
        match self {
            Self::PassThrough => name.to_string(),
            Self::Decorating { prefix, suffix } => format!("{}{}{}", prefix, name, suffix),
        }
    }

    /// Strip at most one leading prefix and one trailing suffix
    pub fn undo_format(&self, name: &str) -> String {
        match self {
            Self::PassThrough => name.to_string(),
            Self::Decorating { prefix, suffix } => {
                let name = name.strip_prefix(prefix.as_str()).unwrap_or(name);
                name.strip_suffix(suffix.as_str()).unwrap_or(name).to_string()
            }
        }
    }
}

/// Name formatter that additionally decorates free-text descriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStringFormatter {
    names: ResourceNameFormatter,
    description_suffix: String,
}

impl ResourceStringFormatter {
    /// Descriptions are only decorated when names are
    pub fn new(names: ResourceNameFormatter) -> Self {
        let description_suffix = match names {
            ResourceNameFormatter::PassThrough => String::new(),
            ResourceNameFormatter::Decorating { .. } => MANAGED_DESCRIPTION_SUFFIX.to_string(),
        };
        Self {
            names,
            description_suffix,
        }
    }

    pub fn names(&self) -> &ResourceNameFormatter {
        &self.names
    }

    pub fn format(&self, name: &str) -> String {
        self.names.format(name)
    }

    pub fn undo_format(&self, name: &str) -> String {
        self.names.undo_format(name)
    }

    pub fn format_description(&self, description: &str) -> String {
        format!("{}{}", description, self.description_suffix)
    }

    pub fn undo_format_description(&self, description: &str) -> String {
        description
            .strip_suffix(self.description_suffix.as_str())
            .unwrap_or(description)
            .to_string()
    }
}
