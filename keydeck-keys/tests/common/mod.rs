//! Shared test doubles

use async_trait::async_trait;
use keydeck_keys::{KeyError, KeyResult, KeyStoreBackend, MemoryKeyStore};
use keydeck_types::{ApiKeyChanges, ApiKeyRecord, KeyId, NewApiKey};
use std::sync::atomic::{AtomicBool, Ordering};

/// Memory store whose calls can be switched to fail
#[derive(Default)]
pub struct SwitchableStore {
    pub inner: MemoryKeyStore,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl SwitchableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> KeyResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(KeyError::Store {
                status: 503,
                message: "store unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyStoreBackend for SwitchableStore {
    fn name(&self) -> &str {
        "switchable"
    }

    async fn insert(&self, new_key: &NewApiKey) -> KeyResult<ApiKeyRecord> {
        self.check()?;
        self.inner.insert(new_key).await
    }

    async fn list(&self) -> KeyResult<Vec<ApiKeyRecord>> {
        self.check()?;
        self.inner.list().await
    }

    async fn find_by_key(&self, key: &str) -> KeyResult<Vec<ApiKeyRecord>> {
        self.check()?;
        self.inner.find_by_key(key).await
    }

    async fn update(&self, id: &KeyId, changes: &ApiKeyChanges) -> KeyResult<ApiKeyRecord> {
        self.check()?;
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: &KeyId) -> KeyResult<()> {
        self.check()?;
        self.inner.delete(id).await
    }
}
