//! Shared server state

use keydeck_config::ServerConfig;
use keydeck_keys::{KeyGenerator, KeyLifecycleManager, KeyStoreBackend, SessionValidator};
use std::sync::Arc;
use tokio::sync::Mutex;

/// State handed to every handler and to the session gate
#[derive(Clone)]
pub struct AppState {
    /// Dashboard operations are serialised through this lock
    pub dashboard: Arc<Mutex<KeyLifecycleManager>>,
    pub sessions: SessionValidator,
    pub protected_prefix: String,
    pub entry_path: String,
}

impl AppState {
    /// Build state around one store client shared by the dashboard and the gate
    pub fn new(store: Arc<dyn KeyStoreBackend>, config: &ServerConfig) -> Self {
        let generator = KeyGenerator::new(config.key_prefix.clone());
        Self {
            dashboard: Arc::new(Mutex::new(KeyLifecycleManager::new(
                store.clone(),
                generator,
            ))),
            sessions: SessionValidator::new(store),
            protected_prefix: config.protected_prefix.clone(),
            entry_path: config.entry_path.clone(),
        }
    }
}
