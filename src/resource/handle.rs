//! Resource handles
//!
//! A [`ResourceHandle`] describes one resource type: its schema, the state
//! schema version with the upgraders leading to it, the REST resource it is
//! stored in and the two conversions between local state and the wire type.
//! Handles are plain values built once at provider start and shared by all
//! lifecycle calls.

use super::data::{RawState, ResourceData};
use super::error::ProviderError;
use super::formatter::ResourceNameFormatter;
use super::schema::Schema;
use crate::instana::client::InstanaApi;
use crate::instana::rest::{RestObject, RestResource};
use std::fmt;

/// Pure migration of raw state from `version` to `version + 1`
pub type UpgradeFn = fn(RawState) -> Result<RawState, String>;

/// Selects the REST resource a handle is stored in
pub type RestFactory<T> = fn(&InstanaApi) -> RestResource<T>;

/// Writes a remote object into local state, including its id
pub type Projector<T> = fn(&mut ResourceData, &T) -> Result<(), ProviderError>;

/// Builds the transport object for the planned state
pub type Materializer<T> = fn(&ResourceData, &ResourceNameFormatter) -> Result<T, ProviderError>;

#[derive(Clone, Copy)]
pub struct StateUpgrader {
    /// The version this upgrader migrates from
    pub version: u32,
    pub upgrade: UpgradeFn,
}

pub struct ResourceHandle<T> {
    resource_name: &'static str,
    schema: Schema,
    schema_version: u32,
    state_upgraders: Vec<StateUpgrader>,
    rest_factory: RestFactory<T>,
    project_remote: Projector<T>,
    materialize_local: Materializer<T>,
}

impl<T: RestObject> ResourceHandle<T> {
    /// Upgraders must be numbered `0, 1, 2, …` and may not run past
    /// `schema_version`. Versions at or above the number of upgraders need
    /// no migration.
    pub fn new(
        resource_name: &'static str,
        schema: Schema,
        schema_version: u32,
        state_upgraders: Vec<StateUpgrader>,
        rest_factory: RestFactory<T>,
        project_remote: Projector<T>,
        materialize_local: Materializer<T>,
    ) -> Result<Self, ProviderError> {
        let invalid = |message: String| ProviderError::InvalidHandle {
            resource: resource_name.to_string(),
            message,
        };

        if resource_name.is_empty() {
            return Err(invalid("resource name must not be empty".to_string()));
        }
        if (schema_version as usize) < state_upgraders.len() {
            return Err(invalid(format!(
                "schema version {} is lower than the number of state upgraders ({})",
                schema_version,
                state_upgraders.len()
            )));
        }
        for (expected, upgrader) in state_upgraders.iter().enumerate() {
            if upgrader.version as usize != expected {
                return Err(invalid(format!(
                    "state upgrader #{} migrates from version {}, expected {}",
                    expected, upgrader.version, expected
                )));
            }
        }

        Ok(Self {
            resource_name,
            schema,
            schema_version,
            state_upgraders,
            rest_factory,
            project_remote,
            materialize_local,
        })
    }

    pub fn resource_name(&self) -> &'static str {
        self.resource_name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn state_upgraders(&self) -> &[StateUpgrader] {
        &self.state_upgraders
    }

    pub fn rest_resource(&self, api: &InstanaApi) -> RestResource<T> {
        (self.rest_factory)(api)
    }

    pub fn project(&self, data: &mut ResourceData, object: &T) -> Result<(), ProviderError> {
        (self.project_remote)(data, object)
    }

    pub fn materialize(
        &self,
        data: &ResourceData,
        formatter: &ResourceNameFormatter,
    ) -> Result<T, ProviderError> {
        (self.materialize_local)(data, formatter)
    }

    /// Migrate raw state persisted at `from_version` to the current version
    pub fn upgrade_state(&self, raw: RawState, from_version: u32) -> Result<RawState, ProviderError> {
        if from_version > self.schema_version {
            return Err(ProviderError::Upgrade {
                resource: self.resource_name.to_string(),
                from: from_version,
                message: format!(
                    "state was written by a newer release (current schema version is {})",
                    self.schema_version
                ),
            });
        }

        self.state_upgraders
            .iter()
            .skip(from_version as usize)
            .try_fold(raw, |state, upgrader| {
                (upgrader.upgrade)(state).map_err(|message| ProviderError::Upgrade {
                    resource: self.resource_name.to_string(),
                    from: upgrader.version,
                    message,
                })
            })
    }
}

impl<T> fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("resource_name", &self.resource_name)
            .field("schema_version", &self.schema_version)
            .field("state_upgraders", &self.state_upgraders.len())
            .field("fields", &self.schema.len())
            .finish()
    }
}
