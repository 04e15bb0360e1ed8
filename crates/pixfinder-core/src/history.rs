use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::{CoreError, CoreErrorKind, HistoryList};
use crate::persistence::{KeyValueStore, PersistenceResult};

pub const HISTORY_KEY: &str = "searchHistory";

/// Recent search terms persisted under a single key as a JSON array.
///
/// Reads fail open: a missing, unreadable, or unparsable value is an empty
/// history. Writes that fail are logged and the updated list is still
/// returned, so the in-memory view never rolls back.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> HistoryList {
        match self.read().await {
            Ok(history) => history,
            Err(error) => {
                tracing::warn!(
                    kind = ?error.kind,
                    message = %error.message,
                    "failed to load search history; treating it as empty"
                );
                HistoryList::new()
            }
        }
    }

    pub async fn record(&self, query: &str) -> HistoryList {
        self.record_with(query, |_| {}).await
    }

    /// Records `query` and hands the updated list to `observe` before the
    /// write lock is released, so observers see lists in write order.
    pub async fn record_with(
        &self,
        query: &str,
        observe: impl FnOnce(&HistoryList),
    ) -> HistoryList {
        // Read-modify-write must not interleave with another record call.
        let _guard = self.write_lock.lock().await;

        let mut history = self.load().await;
        history.record(query);

        if let Err(error) = self.write(&history).await {
            tracing::error!(
                query,
                kind = ?error.kind,
                message = %error.message,
                "failed to save search history"
            );
        }

        observe(&history);
        history
    }

    async fn read(&self) -> PersistenceResult<HistoryList> {
        let store = self.store.clone();
        let raw = run_blocking(move || store.get(HISTORY_KEY)).await?;
        match raw {
            Some(raw) => serde_json::from_str(&raw).map_err(|error| CoreError {
                kind: CoreErrorKind::ParseFailure,
                message: format!("stored search history is not a JSON string array: {error}"),
            }),
            None => Ok(HistoryList::new()),
        }
    }

    async fn write(&self, history: &HistoryList) -> PersistenceResult<()> {
        let encoded = serde_json::to_string(history).map_err(|error| {
            CoreError::internal(format!("failed to encode search history: {error}"))
        })?;
        let store = self.store.clone();
        run_blocking(move || store.set(HISTORY_KEY, &encoded)).await
    }
}

async fn run_blocking<T: Send + 'static>(
    operation: impl FnOnce() -> PersistenceResult<T> + Send + 'static,
) -> PersistenceResult<T> {
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|join_error| {
            CoreError::internal(format!("history persistence join failure: {join_error}"))
        })?
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{HISTORY_KEY, HistoryStore};
    use crate::models::{CoreError, CoreErrorKind, HISTORY_CAPACITY};
    use crate::persistence::{InMemoryKeyValueStore, KeyValueStore, PersistenceResult};

    fn store_with(raw: Option<&str>) -> (Arc<InMemoryKeyValueStore>, HistoryStore) {
        let backing = Arc::new(InMemoryKeyValueStore::new());
        if let Some(raw) = raw {
            backing.set(HISTORY_KEY, raw).unwrap();
        }
        let history = HistoryStore::new(backing.clone());
        (backing, history)
    }

    #[tokio::test]
    async fn load_returns_empty_when_nothing_is_stored() {
        let (_, history) = store_with(None);
        assert!(history.load().await.is_empty());
    }

    #[tokio::test]
    async fn load_fails_open_on_unparsable_value() {
        for raw in ["not json", r#"{"a":1}"#, "[1,2,3]"] {
            let (_, history) = store_with(Some(raw));
            assert!(history.load().await.is_empty(), "raw {raw}");
        }
    }

    #[tokio::test]
    async fn record_moves_existing_entry_to_front_and_persists() {
        let (backing, history) = store_with(Some(r#"["a","b","c"]"#));

        let updated = history.record("b").await;

        assert_eq!(updated.entries(), ["b", "a", "c"]);
        assert_eq!(
            backing.get(HISTORY_KEY).unwrap().as_deref(),
            Some(r#"["b","a","c"]"#)
        );
    }

    #[tokio::test]
    async fn repeated_records_do_not_grow_the_list() {
        let (_, history) = store_with(None);
        for _ in 0..5 {
            history.record("cats").await;
        }

        assert_eq!(history.load().await.entries(), ["cats"]);
    }

    #[tokio::test]
    async fn concurrent_records_do_not_lose_updates() {
        let (_, history) = store_with(None);
        let history = Arc::new(history);

        let handles: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|query| {
                let history = history.clone();
                tokio::spawn(async move { history.record(query).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let loaded = history.load().await;
        assert_eq!(loaded.len(), 4);
        for query in ["a", "b", "c", "d"] {
            assert!(loaded.contains(query));
        }
    }

    #[tokio::test]
    async fn capacity_holds_across_many_distinct_queries() {
        let (_, history) = store_with(None);
        for index in 0..20 {
            let updated = history.record(&format!("q{index}")).await;
            assert!(updated.len() <= HISTORY_CAPACITY);
        }
    }

    #[tokio::test]
    async fn write_failure_still_returns_updated_list() {
        let failing = Arc::new(FailingWrites::default());
        let history = HistoryStore::new(failing.clone());

        let updated = history.record("dogs").await;

        assert_eq!(updated.entries(), ["dogs"]);
        assert_eq!(failing.writes.load(Ordering::SeqCst), 1);
    }

    #[derive(Default)]
    struct FailingWrites {
        writes: AtomicUsize,
    }

    impl KeyValueStore for FailingWrites {
        fn get(&self, _key: &str) -> PersistenceResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> PersistenceResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::new(CoreErrorKind::StorageFailure, "disk full"))
        }

        fn remove(&self, _key: &str) -> PersistenceResult<()> {
            Ok(())
        }
    }
}
