//! API key lifecycle: the dashboard's view of the `api_keys` table
//!
//! The manager keeps a local copy of the table that is only ever patched
//! from store responses. Store failures never escape as errors; they come
//! back as notifications for the client to show.
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
use crate::generator::KeyGenerator;
use crate::store::KeyStoreBackend;
use crate::visibility::KeyVisibility;
use keydeck_types::{ApiKeyChanges, ApiKeyRecord, KeyId, KeyType, NewApiKey, Notification};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// How many secrets are tried before giving up on a collision-free one
pub const MAX_KEY_ATTEMPTS: usize = 3;

/// Fixed notification texts
pub mod messages {
    pub const LOAD_FAILED: &str = "Failed to load API keys";
    pub const CREATED: &str = "API key created successfully";
    pub const CREATE_FAILED: &str = "Failed to create API key";
    pub const DELETED: &str = "API key deleted";
    pub const DELETE_FAILED: &str = "Failed to delete API key";
    pub const UPDATE_FAILED: &str = "Failed to update API key";
    pub const COPIED: &str = "API key copied to clipboard!";
    pub const COPY_FAILED: &str = "Failed to copy API key";
}

/// The key list could not be fetched
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Failed to load API keys")]
pub struct LoadError;

/// Destination for copied secrets
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String>;
}

/// Result of a create request
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created {
        record: ApiKeyRecord,
        notification: Notification,
    },
    /// Blank name; nothing was sent
    Skipped,
    Failed(Notification),
}

impl CreateOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            CreateOutcome::Created { notification, .. } => Some(notification),
            CreateOutcome::Skipped => None,
            CreateOutcome::Failed(notification) => Some(notification),
        }
    }
}

/// Result of an update request
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    Updated(ApiKeyRecord),
    /// Blank name or key; nothing was sent
    Skipped,
    Failed(Notification),
}

impl UpdateOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            UpdateOutcome::Failed(notification) => Some(notification),
            _ => None,
        }
    }
}

/// Result of a delete request
#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    Deleted(Notification),
    Failed(Notification),
}

impl DeleteOutcome {
    pub fn notification(&self) -> &Notification {
        match self {
            DeleteOutcome::Deleted(notification) | DeleteOutcome::Failed(notification) => {
                notification
            }
        }
    }
}

/// Row currently being edited and its pending values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditSession {
    pub id: KeyId,
    pub values: ApiKeyChanges,
}

/// One table row as the dashboard renders it
#[derive(Debug, Clone, Serialize)]
pub struct KeyRow {
    pub id: KeyId,
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub usage: String,
    pub secret: String,
    pub revealed: bool,
    pub editing: bool,
}

/// Owns the dashboard's key list and keeps it in step with the store
pub struct KeyLifecycleManager {
    store: Arc<dyn KeyStoreBackend>,
    generator: KeyGenerator,
    records: Vec<ApiKeyRecord>,
    visibility: KeyVisibility,
    editing: Option<EditSession>,
    load_error: Option<LoadError>,
}

impl KeyLifecycleManager {
    pub fn new(store: Arc<dyn KeyStoreBackend>, generator: KeyGenerator) -> Self {
        Self {
            store,
            generator,
            records: Vec::new(),
            visibility: KeyVisibility::new(),
            editing: None,
            load_error: None,
        }
    }

    pub fn records(&self) -> &[ApiKeyRecord] {
        &self.records
    }

    pub fn record(&self, id: &KeyId) -> Option<&ApiKeyRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn visibility(&self) -> &KeyVisibility {
        &self.visibility
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn load_error(&self) -> Option<LoadError> {
        self.load_error
    }

    /// Replace the local list with the store's rows, newest first
    pub async fn list(&mut self) -> Result<&[ApiKeyRecord], LoadError> {
        match self.store.list().await {
            Ok(records) => {
                debug!(count = records.len(), "Loaded API keys");
                self.records = records;
                self.load_error = None;
                Ok(self.records.as_slice())
            }
            Err(e) => {
                error!(error = %e, backend = self.store.name(), "Error fetching API keys");
                self.load_error = Some(LoadError);
                Err(LoadError)
            }
        }
    }

    /// Create a key with a freshly generated secret
    ///
    /// The store's returned row is prepended only once the insert succeeds.
    pub async fn create(&mut self, name: &str, key_type: KeyType) -> CreateOutcome {
        if name.trim().is_empty() {
            return CreateOutcome::Skipped;
        }

        match self.insert_new_key(name, key_type).await {
            Ok(record) => {
                info!(key_id = %record.id, key_type = %record.key_type, "API key created");
                self.records.insert(0, record.clone());
                CreateOutcome::Created {
                    record,
                    notification: Notification::success(messages::CREATED),
                }
            }
            Err(e) => {
                error!(error = %e, "Error creating API key");
                CreateOutcome::Failed(Notification::error(messages::CREATE_FAILED))
            }
        }
    }

    async fn insert_new_key(&self, name: &str, key_type: KeyType) -> KeyResult<ApiKeyRecord> {
        let secret = self.unused_secret(key_type).await?;
        let new_key = NewApiKey::new(name, secret, key_type)
            .map_err(|e| KeyError::InvalidRecord(e.to_string()))?;
        self.store.insert(&new_key).await
    }

    async fn unused_secret(&self, key_type: KeyType) -> KeyResult<String> {
        for attempt in 1..=MAX_KEY_ATTEMPTS {
            let secret = self.generator.generate(key_type);
            if self.store.find_by_key(&secret).await?.is_empty() {
                return Ok(secret);
            }
            warn!(attempt, "Generated key already exists, retrying");
        }
        Err(KeyError::KeyCollision(MAX_KEY_ATTEMPTS))
    }

    /// Begin editing a row, seeding the edit values from the record
    pub fn start_editing(&mut self, id: &KeyId) -> Option<&EditSession> {
        let record = self.record(id)?;
        self.editing = Some(EditSession {
            id: record.id,
            values: ApiKeyChanges::new(record.name.clone(), record.key.clone()),
        });
        self.editing.as_ref()
    }

    pub fn cancel_editing(&mut self) {
        self.editing = None;
    }

    /// Save a new name and key for a row
    ///
    /// Blank fields make this a silent no-op. On success the local row is
    /// replaced in place with the store's copy, keeping its position.
    pub async fn update(&mut self, id: &KeyId, changes: ApiKeyChanges) -> UpdateOutcome {
        if !changes.is_complete() {
            debug!(key_id = %id, "Skipping update with blank fields");
            return UpdateOutcome::Skipped;
        }

        match self.store.update(id, &changes).await {
            Ok(record) => {
                if let Some(local) = self.records.iter_mut().find(|r| &r.id == id) {
                    *local = record.clone();
                }
                if self.editing.as_ref().map(|e| &e.id) == Some(id) {
                    self.editing = None;
                }
                info!(key_id = %id, "API key updated");
                UpdateOutcome::Updated(record)
            }
            Err(e) => {
                error!(key_id = %id, error = %e, "Error updating API key");
                UpdateOutcome::Failed(Notification::error(messages::UPDATE_FAILED))
            }
        }
    }

    /// Delete a row from the store, then from the local list and visibility set
    pub async fn delete(&mut self, id: &KeyId) -> DeleteOutcome {
        match self.store.delete(id).await {
            Ok(()) => {
                self.records.retain(|record| &record.id != id);
                self.visibility.forget(id);
                if self.editing.as_ref().map(|e| &e.id) == Some(id) {
                    self.editing = None;
                }
                info!(key_id = %id, "API key deleted");
                // Styled as an error on purpose; matches the dashboard's look
                DeleteOutcome::Deleted(Notification::error(messages::DELETED))
            }
            Err(e) => {
                error!(key_id = %id, error = %e, "Error deleting API key");
                DeleteOutcome::Failed(Notification::error(messages::DELETE_FAILED))
            }
        }
    }

    /// Reveal or hide one row's secret
    ///
    /// Returns the new state, or `None` when the id is not in the list.
    pub fn toggle_visibility(&mut self, id: &KeyId) -> Option<bool> {
        let id = self.record(id)?.id;
        Some(self.visibility.toggle(id))
    }

    /// The secret as currently displayed for a row
    pub fn displayed_secret(&self, id: &KeyId) -> Option<String> {
        self.record(id)
            .map(|record| self.visibility.display(&record.id, &record.key))
    }

    /// Copy a row's full secret, whatever its visibility
    pub fn copy_key(&self, id: &KeyId, clipboard: &mut dyn Clipboard) -> Notification {
        let Some(record) = self.record(id) else {
            warn!(key_id = %id, "Copy requested for unknown key");
            return Notification::error(messages::COPY_FAILED);
        };

        match clipboard.write_text(&record.key) {
            Ok(()) => Notification::info(messages::COPIED),
            Err(e) => {
                warn!(key_id = %id, error = %e, "Failed to copy API key");
                Notification::error(messages::COPY_FAILED)
            }
        }
    }

    /// Rows ready for rendering, in list order
    pub fn rows(&self) -> Vec<KeyRow> {
        self.records.iter().map(|record| self.render(record)).collect()
    }

    pub fn row(&self, id: &KeyId) -> Option<KeyRow> {
        self.record(id).map(|record| self.render(record))
    }

    fn render(&self, record: &ApiKeyRecord) -> KeyRow {
        KeyRow {
            id: record.id,
            name: record.name.clone(),
            key_type: record.key_type,
            usage: record.usage.clone(),
            secret: self.visibility.display(&record.id, &record.key),
            revealed: self.visibility.is_revealed(&record.id),
            editing: self.editing.as_ref().map(|e| e.id) == Some(record.id),
        }
    }
}
