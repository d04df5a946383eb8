//! External client directory (the agency's client/tour CRUD backend).
//!
//! The ledger core only needs name backfill during materialization, so
//! the directory is injected as a capability rather than imported
//! ambiently.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// A record from the client directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryClient {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub phone_number: String,
}

#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Look a client up by phone number. `Ok(None)` means the directory
    /// answered but has no such client.
    async fn get_by_phone(&self, phone: &str) -> Result<Option<DirectoryClient>>;

    async fn list_all(&self) -> Result<Vec<DirectoryClient>>;
}

/// Directory backed by the agency CRUD backend over HTTP.
pub struct HttpClientDirectory {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClientDirectory {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ClientDirectory for HttpClientDirectory {
    async fn get_by_phone(&self, phone: &str) -> Result<Option<DirectoryClient>> {
        let url = format!("{}/clients/{}", self.base_url, phone);
        let resp = self.http.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let client = resp.error_for_status()?.json::<DirectoryClient>().await?;
        Ok(Some(client))
    }

    async fn list_all(&self) -> Result<Vec<DirectoryClient>> {
        let url = format!("{}/clients", self.base_url);
        let clients = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<DirectoryClient>>()
            .await?;
        Ok(clients)
    }
}

/// Directory for deployments without a CRUD backend. Never finds
/// anyone, so materialization falls back to the generic name.
pub struct NullDirectory;

#[async_trait]
impl ClientDirectory for NullDirectory {
    async fn get_by_phone(&self, _phone: &str) -> Result<Option<DirectoryClient>> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<DirectoryClient>> {
        Ok(Vec::new())
    }
}
