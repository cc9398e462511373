//! Hosted key store over a PostgREST-style HTTP API
//!
//! Requests go to `<url>/rest/v1/api_keys` and carry the anonymous token in
//! both the `apikey` and `Authorization` headers. Writes ask for the stored
//! row back with `Prefer: return=representation`.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{KeyError, KeyResult};
use crate::store::{KeyStoreBackend, API_KEYS_TABLE};
use async_trait::async_trait;
use keydeck_config::KeyStoreConfig;
use keydeck_types::{ApiKeyChanges, ApiKeyRecord, KeyId, NewApiKey};
use std::time::Duration;
use tracing::{debug, info, warn};

const REST_PATH: &str = "rest/v1";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Key store backed by a hosted REST endpoint
pub struct RestKeyStore {
    table_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl RestKeyStore {
    /// Create a REST store client
    ///
    /// An empty `url` is accepted; every call then fails as a store error.
    pub fn new(url: &str, anon_key: &str, timeout: Option<Duration>) -> KeyResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| KeyError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        if url.trim().is_empty() {
            warn!("KEY_STORE_URL is not set, key store calls will fail");
        }

        Ok(Self {
            table_url: format!(
                "{}/{}/{}",
                url.trim().trim_end_matches('/'),
                REST_PATH,
                API_KEYS_TABLE
            ),
            anon_key: anon_key.to_string(),
            client,
        })
    }

    pub fn from_config(config: &KeyStoreConfig) -> KeyResult<Self> {
        Self::new(
            &config.url,
            &config.anon_key,
            config.timeout_seconds.map(Duration::from_secs),
        )
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    /// Transport errors drop their URL; a key lookup carries the secret in it
    async fn send(&self, request: reqwest::RequestBuilder) -> KeyResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| KeyError::Http(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(KeyError::Store {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn fetch_rows(&self, request: reqwest::RequestBuilder) -> KeyResult<Vec<ApiKeyRecord>> {
        let response = self.send(request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| KeyError::Http(e.without_url()))?;
        let rows: Vec<ApiKeyRecord> = serde_json::from_str(&body)?;
        Ok(rows)
    }
}

/// Exactly one row is expected back from a single-row write
fn single_row(mut rows: Vec<ApiKeyRecord>, missing: impl FnOnce() -> KeyError) -> KeyResult<ApiKeyRecord> {
    match rows.len() {
        0 => Err(missing()),
        1 => Ok(rows.remove(0)),
        n => Err(KeyError::InvalidResponse(format!(
            "expected one row, store returned {}",
            n
        ))),
    }
}

#[async_trait]
impl KeyStoreBackend for RestKeyStore {
    fn name(&self) -> &str {
        "rest"
    }

    async fn insert(&self, new_key: &NewApiKey) -> KeyResult<ApiKeyRecord> {
        let request = self
            .request(reqwest::Method::POST)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[new_key]);

        let rows = self.fetch_rows(request).await?;
        let record = single_row(rows, || {
            KeyError::InvalidResponse("insert returned no row".to_string())
        })?;

        info!(key_id = %record.id, key_type = %record.key_type, "Inserted key");
        Ok(record)
    }

    async fn list(&self) -> KeyResult<Vec<ApiKeyRecord>> {
        let request = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let rows = self.fetch_rows(request).await?;
        debug!("Fetched {} keys", rows.len());
        Ok(rows)
    }

    async fn find_by_key(&self, key: &str) -> KeyResult<Vec<ApiKeyRecord>> {
        let filter = format!("eq.{}", key);
        let request = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*"), ("key", filter.as_str())]);

        self.fetch_rows(request).await
    }

    async fn update(&self, id: &KeyId, changes: &ApiKeyChanges) -> KeyResult<ApiKeyRecord> {
        let filter = format!("eq.{}", id);
        let request = self
            .request(reqwest::Method::PATCH)
            .query(&[("id", filter.as_str())])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(changes);

        let rows = self.fetch_rows(request).await?;
        let record = single_row(rows, || KeyError::NotFound(id.to_string()))?;

        info!(key_id = %id, "Updated key");
        Ok(record)
    }

    async fn delete(&self, id: &KeyId) -> KeyResult<()> {
        let filter = format!("eq.{}", id);
        let request = self
            .request(reqwest::Method::DELETE)
            .query(&[("id", filter.as_str())]);

        self.send(request).await?;
        info!(key_id = %id, "Deleted key");
        Ok(())
    }
}
