pub mod auth_api;
pub mod resource;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

use crate::auth::{Credential, SharedTokenStore};
use crate::config::ClientConfig;
use crate::error::ClientError;

pub use auth_api::{AuthClient, RegisterRequest};
pub use resource::ResourceClient;

/// Typed CRUD over one backend collection
#[async_trait]
pub trait Resource<T>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Vec<T>, ClientError>;

    async fn get(&self, id: &str) -> Result<T, ClientError>;

    async fn create(&self, payload: &Value) -> Result<T, ClientError>;

    async fn update(&self, id: &str, payload: &Value) -> Result<T, ClientError>;

    async fn remove(&self, id: &str) -> Result<(), ClientError>;
}

/// Server-side paging and filtering, sent as query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub search: Option<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn page(limit: u32, offset: u32) -> Self {
        Self { limit: Some(limit), offset: Some(offset), ..Self::default() }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() { None } else { Some(search) };
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        for (k, v) in &self.filters {
            pairs.push((k.clone(), v.clone()));
        }
        pairs
    }
}

/// Accepts both `{"data": ...}` envelopes and bare bodies
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

/// Shared HTTP plumbing: base URL, timeout, credential lookup
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    store: SharedTokenStore,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, store: SharedTokenStore) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("coachdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url: config.base_url()?, store })
    }

    pub fn store(&self) -> &SharedTokenStore {
        &self.store
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// The current bearer token, or `Unauthenticated` without touching the network
    pub fn bearer(&self) -> Result<String, ClientError> {
        match self.store.credential() {
            Credential::Valid { token, .. } => Ok(token),
            Credential::Absent | Credential::Expired { .. } => Err(ClientError::Unauthenticated),
        }
    }

    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    pub fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.bearer()?;
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    /// Send and fold every transport or status failure into `RequestFailed`
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let request = request.build().map_err(ClientError::from)?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            ClientError::from(e)
        })?;

        let status = response.status();
        tracing::debug!("{} {} -> {}", method, path, status.as_u16());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("{} {} returned {}", method, path, status.as_u16());
        Err(ClientError::request_failed(status.as_u16(), body))
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        decode_body(response).await
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let text = response.text().await.map_err(ClientError::from)?;
    serde_json::from_str::<Envelope<T>>(&text)
        .map(Envelope::into_inner)
        .map_err(|e| {
            tracing::warn!("Malformed response body: {}", e);
            ClientError::request_failed(status, format!("malformed response body: {}", e))
        })
}
