//! Host driver
//!
//! Sequential apply/refresh/destroy/import on top of the provider, keeping
//! the state file in sync after every resource.

use crate::resource::naming::{display_name, FULL_NAME_FIELD, NAME_FIELD};
use crate::resource::schema::{FieldType, Presence};
use crate::resource::{Provider, RawState, ResourceData, ResourceDefinition};
use crate::state::{StateFile, StoredResource};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Desired resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub label: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub config: RawState,
}

impl Manifest {
    /// Load a YAML or JSON manifest
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        manifest.check_labels()?;
        Ok(manifest)
    }

    fn check_labels(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for entry in &self.resources {
            if entry.label.is_empty() {
                bail!("Manifest entry of type {} has an empty label", entry.resource_type);
            }
            if !seen.insert(entry.label.as_str()) {
                bail!("Duplicate label in manifest: {}", entry.label);
            }
        }
        Ok(())
    }
}

/// What an apply did, by label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub deleted: Vec<String>,
}

pub struct Host<'a> {
    provider: &'a Provider,
    state_path: PathBuf,
    state: StateFile,
}

impl<'a> Host<'a> {
    pub fn open(provider: &'a Provider, state_path: impl Into<PathBuf>) -> Result<Self> {
        let state_path = state_path.into();
        let state = StateFile::load(&state_path)?;
        Ok(Self {
            provider,
            state_path,
            state,
        })
    }

    pub fn state(&self) -> &StateFile {
        &self.state
    }

    /// Bring the remote objects in line with `manifest`
    pub async fn apply(&mut self, manifest: &Manifest) -> Result<ApplySummary> {
        manifest.check_labels()?;
        let provider = self.provider;
        let meta = provider.meta();
        let mut summary = ApplySummary::default();

        for entry in &manifest.resources {
            let definition = provider.resource(&entry.resource_type)?;

            let mut data = match self.state.get(&entry.label) {
                Some(stored) if stored.resource_type != entry.resource_type => bail!(
                    "{} is stored as {} but declared as {}; destroy it first",
                    entry.label,
                    stored.resource_type,
                    entry.resource_type
                ),
                Some(stored) => self.load(definition, &entry.label, stored)?,
                None => ResourceData::new(),
            };

            definition
                .read(meta, &mut data)
                .await
                .with_context(|| format!("Failed to read {}", entry.label))?;
            if !data.is_persisted() {
                // gone remotely: recreate from an empty state
                data = ResourceData::new();
            }
            data.commit();

            definition
                .plan(&mut data, &entry.config)
                .with_context(|| format!("Invalid configuration for {}", entry.label))?;

            if !data.is_persisted() {
                definition
                    .create(meta, &mut data)
                    .await
                    .with_context(|| format!("Failed to create {}", entry.label))?;
                tracing::info!(
                    "Created {} {} (id: {})",
                    entry.resource_type,
                    entry.label,
                    data.id()
                );
                summary.created.push(entry.label.clone());
            } else if !data.changed_fields().is_empty() {
                tracing::debug!("{} changed fields: {:?}", entry.label, data.changed_fields());
                definition
                    .update(meta, &mut data)
                    .await
                    .with_context(|| format!("Failed to update {}", entry.label))?;
                tracing::info!(
                    "Updated {} {} (id: {})",
                    entry.resource_type,
                    entry.label,
                    data.id()
                );
                summary.updated.push(entry.label.clone());
            } else {
                summary.unchanged.push(entry.label.clone());
            }

            data.commit();
            self.store(&entry.label, definition, &data)?;
        }

        let orphans: Vec<String> = self
            .state
            .labels()
            .into_iter()
            .filter(|label| !manifest.resources.iter().any(|e| &e.label == label))
            .collect();
        for label in orphans {
            self.delete_stored(&label).await?;
            summary.deleted.push(label);
        }

        Ok(summary)
    }

    /// Re-read every stored resource; resources gone remotely are dropped
    pub async fn refresh(&mut self) -> Result<Vec<String>> {
        let provider = self.provider;
        let mut dropped = Vec::new();

        for label in self.state.labels() {
            let Some(stored) = self.state.get(&label) else {
                continue;
            };
            let definition = provider.resource(&stored.resource_type)?;
            let mut data = self.load(definition, &label, stored)?;

            definition
                .read(provider.meta(), &mut data)
                .await
                .with_context(|| format!("Failed to read {}", label))?;

            if data.is_persisted() {
                data.commit();
                self.store(&label, definition, &data)?;
            } else {
                tracing::info!("{} no longer exists remotely", label);
                self.state.remove(&label);
                self.save()?;
                dropped.push(label);
            }
        }

        Ok(dropped)
    }

    /// Delete every stored resource
    pub async fn destroy(&mut self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for label in self.state.labels() {
            self.delete_stored(&label).await?;
            deleted.push(label);
        }
        Ok(deleted)
    }

    /// Adopt the remote object `id` under `label`
    pub async fn import(&mut self, resource_type: &str, label: &str, id: &str) -> Result<()> {
        if self.state.get(label).is_some() {
            bail!("{} is already managed", label);
        }

        let provider = self.provider;
        let definition = provider.resource(resource_type)?;
        let meta = provider.meta();
        let mut data = ResourceData::new();

        definition
            .import(meta, &mut data, id)
            .await
            .with_context(|| format!("Failed to import {} {}", resource_type, id))?;
        if !data.is_persisted() {
            bail!("Cannot import non-existent remote object {} {}", resource_type, id);
        }

        // The user-facing name is the transmitted one without decoration
        let full_name = data.get_string(FULL_NAME_FIELD)?;
        data.set(NAME_FIELD, display_name(&full_name, &meta.formatter));
        data.commit();

        tracing::info!("Imported {} {} (id: {})", resource_type, label, id);
        self.store(label, definition, &data)
    }

    /// Rehydrate stored attributes, upgraded to the current schema version
    fn load(
        &self,
        definition: &ResourceDefinition,
        label: &str,
        stored: &StoredResource,
    ) -> Result<ResourceData> {
        let attributes = if stored.schema_version == definition.schema_version() {
            stored.attributes.clone()
        } else {
            tracing::info!(
                "Upgrading {} from schema version {} to {}",
                label,
                stored.schema_version,
                definition.schema_version()
            );
            definition
                .upgrade_state(stored.attributes.clone(), stored.schema_version)
                .with_context(|| format!("Failed to upgrade state of {}", label))?
        };
        Ok(ResourceData::from_state(stored.id.clone(), attributes))
    }

    async fn delete_stored(&mut self, label: &str) -> Result<()> {
        let Some(stored) = self.state.get(label) else {
            return Ok(());
        };
        let provider = self.provider;
        let definition = provider.resource(&stored.resource_type)?;
        let mut data = self.load(definition, label, stored)?;
        let id = data.id().to_string();

        definition
            .delete(provider.meta(), &mut data)
            .await
            .with_context(|| format!("Failed to delete {}", label))?;
        tracing::info!("Deleted {} {} (id: {})", definition.resource_name(), label, id);

        self.state.remove(label);
        self.save()
    }

    fn store(&mut self, label: &str, definition: &ResourceDefinition, data: &ResourceData) -> Result<()> {
        self.state.insert(
            label,
            StoredResource::from_data(definition.resource_name(), definition.schema_version(), data),
        );
        self.save()
    }

    fn save(&self) -> Result<()> {
        self.state.save(&self.state_path)
    }
}

/// One line per field: name, type and presence
pub fn schema_summary(definition: &ResourceDefinition) -> Vec<String> {
    let mut lines = vec![format!(
        "{} (schema version {})",
        definition.resource_name(),
        definition.schema_version()
    )];
    describe_fields(definition.schema(), "  ", &mut lines);
    lines
}

fn describe_fields(schema: &crate::resource::Schema, indent: &str, lines: &mut Vec<String>) {
    for (name, field) in schema.iter() {
        let presence = match field.presence {
            Presence::Required => "required",
            Presence::Optional => "optional",
            Presence::Computed => "computed",
        };
        let sensitive = if field.sensitive { ", sensitive" } else { "" };
        lines.push(format!(
            "{}{}: {} ({}{})",
            indent,
            name,
            type_name(&field.field_type),
            presence,
            sensitive
        ));
        if let FieldType::Block(block) = &field.field_type {
            describe_fields(block, &format!("{}  ", indent), lines);
        }
    }
}

fn type_name(field_type: &FieldType) -> String {
    match field_type {
        FieldType::String => "string".to_string(),
        FieldType::Int => "int".to_string(),
        FieldType::Float => "float".to_string(),
        FieldType::Bool => "bool".to_string(),
        FieldType::List(inner) => format!("list({})", type_name(inner)),
        FieldType::Set(inner) => format!("set({})", type_name(inner)),
        FieldType::Map => "map(string)".to_string(),
        FieldType::Block(_) => "block".to_string(),
    }
}
