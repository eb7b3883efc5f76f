///! API client for the control plane

use anyhow::Result;
use dbctl_core::document::Document;
use dbctl_core::lookup::{GroupVersionResource, BACKUP_JOBS, CLUSTERS, CLUSTER_DEFINITIONS};
use dbctl_core::{Manifest, ResourceLookup};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    token: Arc<RwLock<Option<String>>>,
}

/// Path of a resource collection, or of one resource when `name` is given
pub fn resource_path(
    gvr: &GroupVersionResource,
    namespace: Option<&str>,
    name: Option<&str>,
) -> String {
    let mut path = format!("/apis/{}/{}", gvr.group, gvr.version);
    if let Some(namespace) = namespace {
        path.push_str(&format!("/namespaces/{}", urlencoding::encode(namespace)));
    }
    path.push('/');
    path.push_str(gvr.resource);
    if let Some(name) = name {
        path.push_str(&format!("/{}", urlencoding::encode(name)));
    }
    path
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the authentication token
    pub async fn set_token(&self, token: String) {
        let mut t = self.token.write().await;
        *t = Some(token);
    }

    /// Get the current token
    pub async fn get_token(&self) -> Option<String> {
        let t = self.token.read().await;
        t.clone()
    }

    /// Build request with authentication header
    async fn build_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);

        if let Some(token) = self.get_token().await {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!(path, "GET");
        let response = self.build_request(reqwest::Method::GET, path)
            .await
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, error_text);
        }

        let data = response.json().await?;
        Ok(data)
    }

    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(path, "POST");
        let response = self.build_request(reqwest::Method::POST, path)
            .await
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, error_text);
        }

        let data = response.json().await?;
        Ok(data)
    }

    /// Submit a composed cluster manifest
    pub async fn create_cluster(&self, manifest: &Manifest) -> Result<Document> {
        let namespace = manifest.namespace().unwrap_or("default");
        let path = resource_path(&CLUSTERS, Some(namespace), None);
        self.post(&path, manifest.content()).await
    }
}

#[async_trait::async_trait]
impl ResourceLookup for ApiClient {
    async fn get_backup_job(&self, namespace: &str, name: &str) -> dbctl_core::Result<Document> {
        let path = resource_path(&BACKUP_JOBS, Some(namespace), Some(name));
        self.get(&path).await.map_err(|e| {
            dbctl_core::Error::RemoteLookup(format!(
                "backup job '{}' in namespace '{}': {:#}",
                name, namespace, e
            ))
        })
    }

    async fn get_cluster_definition(&self, name: &str) -> dbctl_core::Result<Document> {
        let path = resource_path(&CLUSTER_DEFINITIONS, None, Some(name));
        self.get(&path).await.map_err(|e| {
            dbctl_core::Error::RemoteLookup(format!("cluster definition '{}': {:#}", name, e))
        })
    }
}
