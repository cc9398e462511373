//! Keydeck Server
//!
//! API key dashboard backed by a shared key store, with a session gate in
//! front of the protected view:
//! - Lists, creates, edits and deletes keys
//! - Issues a session cookie for a valid key
//! - Redirects protected requests without a valid key to key entry
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


use anyhow::Result;
use keydeck_config::AppConfig;
use keydeck_keys::init_key_store;
use keydeck_logging::LogFormat;
use keydeck_server::health::SERVICE_NAME;
use keydeck_server::{AppState, KeydeckServer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    keydeck_logging::init(
        SERVICE_NAME,
        config.log_level(),
        LogFormat::from_json_flag(config.json_logs()),
    );

    info!("Starting Keydeck server");

    info!(
        backend = ?config.key_store.backend,
        port = config.server.port,
        protected_prefix = %config.server.protected_prefix,
        entry_path = %config.server.entry_path,
        "Configuration loaded"
    );

    let store = init_key_store(&config.key_store)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize key store: {}", e))?;

    let state = AppState::new(store, &config.server);

    // Prime the dashboard list; a failure here is shown on the next listing
    if let Err(e) = state.dashboard.lock().await.list().await {
        warn!(error = %e, "Initial key listing failed");
    }

    KeydeckServer::new(config.server.port, state).start().await?;

    info!("Keydeck server shut down");
    Ok(())
}
