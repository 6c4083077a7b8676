//! Lifecycle driver
//!
//! Create, read, update, delete and import, implemented once for every
//! resource handle. The driver does not retry and does not log; failures
//! are returned to the caller unchanged.
//!
//! Per instance the states are `Unpersisted` (empty id) and
//! `Persisted(id)`:
//!
//! - create: `Unpersisted` → `Persisted(id)`
//! - read: `Persisted(id)` → `Persisted(id)`, or `Unpersisted` when the
//!   remote object is gone
//! - update: `Persisted(id)` → `Persisted(id)`
//! - delete: `Persisted(id)` → `Unpersisted`

use super::data::ResourceData;
use super::error::ProviderError;
use super::handle::ResourceHandle;
use super::registry::ProviderMeta;
use crate::instana::error::RestError;
use crate::instana::rest::RestObject;

/// Materialize the planned state, upsert it and project the canonical
/// object back. On failure the data keeps its previous id.
pub async fn create<T: RestObject>(
    handle: &ResourceHandle<T>,
    meta: &ProviderMeta,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    upsert(handle, meta, data).await
}

/// Refresh the state from the remote object. A missing remote object
/// clears the id so that the host plans a re-create.
pub async fn read<T: RestObject>(
    handle: &ResourceHandle<T>,
    meta: &ProviderMeta,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    if !data.is_persisted() {
        return Ok(());
    }

    let rest = handle.rest_resource(&meta.api);
    match rest.get_one(data.id()).await {
        Ok(object) => handle.project(data, &object),
        Err(RestError::NotFound { .. }) => {
            data.set_id("");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Same as create, for a resource that already has an id
pub async fn update<T: RestObject>(
    handle: &ResourceHandle<T>,
    meta: &ProviderMeta,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    if !data.is_persisted() {
        return Err(ProviderError::MissingId {
            resource: handle.resource_name().to_string(),
        });
    }
    upsert(handle, meta, data).await
}

/// Delete the remote object; an object that is already gone counts as
/// deleted. The id is kept when the call fails.
pub async fn delete<T: RestObject>(
    handle: &ResourceHandle<T>,
    meta: &ProviderMeta,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    if !data.is_persisted() {
        return Ok(());
    }

    let rest = handle.rest_resource(&meta.api);
    match rest.delete(data.id()).await {
        Ok(()) | Err(RestError::NotFound { .. }) => {
            data.set_id("");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Adopt an existing remote object by id
pub async fn import<T: RestObject>(
    handle: &ResourceHandle<T>,
    meta: &ProviderMeta,
    data: &mut ResourceData,
    id: &str,
) -> Result<(), ProviderError> {
    data.set_id(id);
    read(handle, meta, data).await
}

async fn upsert<T: RestObject>(
    handle: &ResourceHandle<T>,
    meta: &ProviderMeta,
    data: &mut ResourceData,
) -> Result<(), ProviderError> {
    let object = handle.materialize(data, &meta.formatter)?;
    let rest = handle.rest_resource(&meta.api);
    let canonical = rest.upsert(&object).await?;
    handle.project(data, &canonical)
}
