//! Key store backend interface
//!
//! The `api_keys` table lives outside this process. Every backend offers the
//! same five operations:
//! - Hosted PostgREST endpoint (`rest_store`)
//! - Direct Postgres connection (`postgres_store`)
//! - In-process table for development and tests (`memory_store`)
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


use crate::error::KeyResult;
use async_trait::async_trait;
use keydeck_types::{ApiKeyChanges, ApiKeyRecord, KeyId, NewApiKey};

/// Table name shared by every backend
pub const API_KEYS_TABLE: &str = "api_keys";

/// Trait for `api_keys` table backends
#[async_trait]
pub trait KeyStoreBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Insert one row and return it as stored
    async fn insert(&self, new_key: &NewApiKey) -> KeyResult<ApiKeyRecord>;

    /// All rows, newest `created_at` first
    async fn list(&self) -> KeyResult<Vec<ApiKeyRecord>>;

    /// Rows whose `key` column equals `key`
    ///
    /// Duplicate keys are not prevented by the table, so this may return
    /// more than one row.
    async fn find_by_key(&self, key: &str) -> KeyResult<Vec<ApiKeyRecord>>;

    /// Update name and key of one row and return it as stored
    async fn update(&self, id: &KeyId, changes: &ApiKeyChanges) -> KeyResult<ApiKeyRecord>;

    /// Delete one row; deleting a missing id is not an error
    async fn delete(&self, id: &KeyId) -> KeyResult<()>;
}
