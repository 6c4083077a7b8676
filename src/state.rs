//! State file
//!
//! Persists, per resource label, the type tag, the schema version the
//! attributes were written with, the remote id and the committed attributes.

use crate::resource::{RawState, ResourceData};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const STATE_FORMAT_VERSION: u32 = 1;

/// Default state file in the working directory
pub const DEFAULT_STATE_FILE: &str = "instana-provider.state.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    pub format_version: u32,
    #[serde(default)]
    pub resources: BTreeMap<String, StoredResource>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            format_version: STATE_FORMAT_VERSION,
            resources: BTreeMap::new(),
        }
    }
}

/// One managed resource instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: RawState,
}

impl StoredResource {
    /// Capture the committed state of `data`
    pub fn from_data(resource_type: &str, schema_version: u32, data: &ResourceData) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            schema_version,
            id: data.id().to_string(),
            attributes: data.state().clone(),
        }
    }
}

impl StateFile {
    /// Load the state file; a missing file is an empty state
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file {}", path.display()))?;

        if state.format_version > STATE_FORMAT_VERSION {
            bail!(
                "State file {} has format version {}, this release supports up to {}",
                path.display(),
                state.format_version,
                STATE_FORMAT_VERSION
            );
        }
        Ok(state)
    }

    /// Write the state file, replacing the previous one atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let tmp = tmp_path(path);
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write state file {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace state file {}", path.display()))?;
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&StoredResource> {
        self.resources.get(label)
    }

    pub fn insert(&mut self, label: &str, resource: StoredResource) {
        self.resources.insert(label.to_string(), resource);
    }

    pub fn remove(&mut self, label: &str) -> Option<StoredResource> {
        self.resources.remove(label)
    }

    pub fn labels(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
