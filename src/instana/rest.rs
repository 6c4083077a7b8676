//! REST resources
//!
//! Every managed object type is reached through the same three calls:
//! get one by id, upsert, delete. Create and update collapse into a single
//! upsert keyed by id; an empty id means the object has not been persisted.

use super::client::InstanaApi;
use super::error::RestError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use uuid::Uuid;

/// A transport object exchanged with the Instana API
pub trait RestObject: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier assigned on first upsert; empty until then
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// The (decorated) name shown in the Instana UI
    fn display_name(&self) -> &str;
}

/// How an upsert maps onto HTTP requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// `PUT {path}/{id}`; a random id is generated when none is set
    PutById,
    /// `POST {path}` assigns the id, `PUT {path}/{id}` updates
    CreatePostUpdatePut,
    /// Like `CreatePostUpdatePut`, but the name travels as `?name=` and no body is sent
    NameQueryParameter,
}

/// Typed access to one collection of the Instana API
pub struct RestResource<T> {
    api: InstanaApi,
    path: &'static str,
    mode: UpsertMode,
    _marker: PhantomData<fn() -> T>,
}

impl<T: RestObject> RestResource<T> {
    pub fn new(api: InstanaApi, path: &'static str, mode: UpsertMode) -> Self {
        Self {
            api,
            path,
            mode,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn mode(&self) -> UpsertMode {
        self.mode
    }

    /// Fetch a single object. Fails with `NotFound` when the id is unknown.
    pub async fn get_one(&self, id: &str) -> Result<T, RestError> {
        let url = self.api.object_url(self.path, id);
        let value = self.api.http.get(&url).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Create or update an object and return the canonical server version
    pub async fn upsert(&self, object: &T) -> Result<T, RestError> {
        let mut object = object.clone();
        let is_new = object.id().is_empty();

        let response = match self.mode {
            UpsertMode::PutById => {
                if is_new {
                    object.set_id(Uuid::new_v4().to_string());
                }
                let body = serde_json::to_value(&object)?;
                let url = self.api.object_url(self.path, object.id());
                self.api.http.put(&url, Some(&body)).await?
            }
            UpsertMode::CreatePostUpdatePut => {
                let body = serde_json::to_value(&object)?;
                if is_new {
                    let url = self.api.api_url(self.path);
                    self.api.http.post(&url, Some(&body)).await?
                } else {
                    let url = self.api.object_url(self.path, object.id());
                    self.api.http.put(&url, Some(&body)).await?
                }
            }
            UpsertMode::NameQueryParameter => {
                let query = format!("?name={}", urlencoding::encode(object.display_name()));
                if is_new {
                    let url = format!("{}{}", self.api.api_url(self.path), query);
                    self.api.http.post(&url, None).await?
                } else {
                    let url = format!("{}{}", self.api.object_url(self.path, object.id()), query);
                    self.api.http.put(&url, None).await?
                }
            }
        };

        canonical_object(response, object)
    }

    /// Delete an object. An unknown id counts as already deleted.
    pub async fn delete(&self, id: &str) -> Result<(), RestError> {
        let url = self.api.object_url(self.path, id);
        match self.api.http.delete(&url).await {
            Err(err) if err.is_not_found() => {
                tracing::debug!("{} already deleted", url);
                Ok(())
            }
            other => other,
        }
    }
}

/// Decode the upsert response; an empty body echoes the sent object
fn canonical_object<T: RestObject>(response: Option<Value>, sent: T) -> Result<T, RestError> {
    match response {
        Some(value) => Ok(serde_json::from_value(value)?),
        None if !sent.id().is_empty() => Ok(sent),
        None => Err(RestError::Decode(
            "empty response to create request, no id was assigned".to_string(),
        )),
    }
}
