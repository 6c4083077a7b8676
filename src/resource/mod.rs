//! Resource abstraction layer
//!
//! This module turns declarative resource state into Instana REST calls.
//! It is independent of any particular resource type; the types themselves
//! live in [`crate::resources`].
//!
//! # Architecture
//!
//! - [`formatter`] - Name decoration (`format` / `undo_format`)
//! - [`naming`] - Derivation of the transmitted `full_name` from `name`
//! - [`schema`] - Field descriptors and plan-time validation
//! - [`data`] - The per-instance state handle
//! - [`handle`] - Per-type descriptors with state upgraders
//! - [`lifecycle`] - Generic create/read/update/delete/import
//! - [`registry`] - The provider and its registered resource types
//!
//! # Example
//!
//! ```ignore
//! use crate::resource::{Provider, ResourceData};
//!
//! async fn create(provider: &Provider, config: &RawState) -> Result<ResourceData, ProviderError> {
//!     let definition = provider.resource("instana_alerting_channel_email")?;
//!     let mut data = ResourceData::new();
//!     definition.plan(&mut data, config)?;
//!     definition.create(provider.meta(), &mut data).await?;
//!     data.commit();
//!     Ok(data)
//! }
//! ```

pub mod data;
pub mod error;
pub mod formatter;
pub mod handle;
pub mod lifecycle;
pub mod naming;
pub mod registry;
pub mod schema;

pub use data::{RawState, ResourceData};
pub use error::ProviderError;
pub use formatter::{ResourceNameFormatter, ResourceStringFormatter};
pub use handle::{ResourceHandle, StateUpgrader};
pub use registry::{Provider, ProviderMeta, ResourceDefinition};
pub use schema::{FieldSchema, FieldType, Presence, Schema};
