//! Service integration helpers for the key store
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
use crate::memory_store::MemoryKeyStore;
use crate::postgres_store::PostgresKeyStore;
use crate::rest_store::RestKeyStore;
use crate::store::KeyStoreBackend;
use keydeck_config::{KeyStoreBackendKind, KeyStoreConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the key store backend once per process
pub async fn init_key_store(config: &KeyStoreConfig) -> KeyResult<Arc<dyn KeyStoreBackend>> {
    let backend: Arc<dyn KeyStoreBackend> = match config.backend {
        KeyStoreBackendKind::Rest => Arc::new(RestKeyStore::from_config(config)?),
        KeyStoreBackendKind::Postgres => {
            Arc::new(PostgresKeyStore::connect(config.database_url.as_deref()).await)
        }
        KeyStoreBackendKind::Memory => {
            warn!("Using in-memory key store, keys are lost on restart");
            Arc::new(MemoryKeyStore::new())
        }
    };

    info!(backend = backend.name(), "Key store initialized");
    Ok(backend)
}
