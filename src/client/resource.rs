use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

use super::{ApiClient, ListQuery, Resource};
use crate::error::ClientError;
use crate::models::Record;

/// HTTP client for one collection, e.g. `/api/v1/users`.
///
/// Every call needs a live credential and fails with `Unauthenticated`
/// before any request is made when there is none. No retries happen here.
pub struct ResourceClient<T> {
    api: ApiClient,
    path: String,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> ResourceClient<T> {
    pub fn new(api: ApiClient) -> Self {
        Self::at(api, T::RESOURCE)
    }
}

impl<T> ResourceClient<T> {
    pub fn at(api: ApiClient, path: impl Into<String>) -> Self {
        Self { api, path: path.into().trim_matches('/').to_string(), _record: PhantomData }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn item_path(&self, id: &str) -> Result<String, ClientError> {
        let id = id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(ClientError::validation(format!("Invalid id '{}'", id)));
        }
        Ok(format!("{}/{}", self.path, id))
    }
}

#[async_trait]
impl<T> Resource<T> for ResourceClient<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn list(&self, query: &ListQuery) -> Result<Vec<T>, ClientError> {
        let request = self.api.authed(Method::GET, &self.path)?.query(&query.to_pairs());
        self.api.send_json(request).await
    }

    async fn get(&self, id: &str) -> Result<T, ClientError> {
        let path = self.item_path(id)?;
        let request = self.api.authed(Method::GET, &path)?;
        self.api.send_json(request).await
    }

    async fn create(&self, payload: &Value) -> Result<T, ClientError> {
        let request = self.api.authed(Method::POST, &self.path)?.json(payload);
        self.api.send_json(request).await
    }

    async fn update(&self, id: &str, payload: &Value) -> Result<T, ClientError> {
        let path = self.item_path(id)?;
        let request = self.api.authed(Method::PATCH, &path)?.json(payload);
        self.api.send_json(request).await
    }

    async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let path = self.item_path(id)?;
        let request = self.api.authed(Method::DELETE, &path)?;
        self.api.send(request).await?;
        Ok(())
    }
}
