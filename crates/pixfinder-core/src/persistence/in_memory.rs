use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{CoreError, CoreErrorKind};
use crate::persistence::{KeyValueStore, PersistenceResult};

/// Process-local store for tests and for hosts that opt out of persistence.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(
        &self,
    ) -> PersistenceResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| CoreError {
            kind: CoreErrorKind::StorageFailure,
            message: "in-memory key-value store mutex poisoned".to_string(),
        })
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.lock_entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PersistenceResult<()> {
        self.lock_entries()?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> PersistenceResult<()> {
        self.lock_entries()?.remove(key);
        Ok(())
    }
}
