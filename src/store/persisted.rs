//! State synchronized with a single key of the key-value repository.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::KeyValueStore;
use crate::repository::errors::RepositoryResult;

/// In-memory value mirrored to `key` on every change.
///
/// Loading never fails: a missing key, a read error or malformed content all
/// yield the default. Write errors are logged and swallowed, the in-memory
/// value stays authoritative for the lifetime of the process.
pub struct Persisted<T> {
    key: String,
    repo: Arc<dyn KeyValueStore>,
    state: Mutex<T>,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Reads `key` from `repo`, falling back to `default`.
    pub fn load(repo: Arc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let initial = match repo.get_value(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Discarding malformed value stored under `{key}`: {e}");
                default
            }),
            Ok(None) => default,
            Err(e) => {
                warn!("Failed to read `{key}`, using default: {e}");
                default
            }
        };

        Self {
            key,
            repo,
            state: Mutex::new(initial),
        }
    }

    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.lock().clone()
    }

    /// Replaces the value and writes it back.
    pub fn set(&self, value: T) {
        let mut state = self.lock();
        *state = value;
        self.persist(&state);
    }

    /// Mutates the value in place and writes it back.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut state = self.lock();
        let result = f(&mut state);
        self.persist(&state);
        result
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, value: &T) {
        if let Err(e) = self.write(value) {
            error!("Failed to persist `{}`: {e}", self.key);
        }
    }

    fn write(&self, value: &T) -> RepositoryResult<()> {
        let raw = serde_json::to_string(value)?;
        self.repo.set_value(&self.key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::memory::InMemoryRepository;
    use crate::repository::mock::MockRepository;
    use crate::repository::{KeyValueReader, KeyValueWriter};

    #[test]
    fn missing_key_yields_default() {
        let repo = Arc::new(InMemoryRepository::new());
        let value = Persisted::load(repo, "counter", 7u32);
        assert_eq!(value.get(), 7);
    }

    #[test]
    fn stored_value_wins_over_default() {
        let repo = Arc::new(InMemoryRepository::with_entries([("names", r#"["a","b"]"#)]));
        let value = Persisted::load(repo, "names", Vec::<String>::new());
        assert_eq!(value.get(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn malformed_value_yields_default() {
        let repo = Arc::new(InMemoryRepository::with_entries([("names", "{not json")]));
        let value = Persisted::load(repo, "names", vec!["x".to_string()]);
        assert_eq!(value.get(), vec!["x".to_string()]);
    }

    #[test]
    fn every_change_is_written_back() {
        let repo = Arc::new(InMemoryRepository::new());
        let value = Persisted::load(repo.clone(), "n", 1u32);

        value.set(2);
        assert_eq!(repo.get_value("n").unwrap().as_deref(), Some("2"));

        let doubled = value.update(|n| {
            *n *= 2;
            *n
        });
        assert_eq!(doubled, 4);
        assert_eq!(repo.get_value("n").unwrap().as_deref(), Some("4"));
    }

    #[test]
    fn read_failure_falls_back_to_default() {
        let mut repo = MockRepository::new();
        repo.expect_get_value()
            .with(eq("prefs"))
            .returning(|_| Err(RepositoryError::ConnectionError("down".into())));

        let value = Persisted::load(Arc::new(repo), "prefs", 3i64);
        assert_eq!(value.get(), 3);
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let mut repo = MockRepository::new();
        repo.expect_get_value().returning(|_| Ok(None));
        repo.expect_set_value()
            .with(eq("prefs"), eq("5"))
            .times(1)
            .returning(|_, _| Err(RepositoryError::DatabaseError("disk full".into())));

        let value = Persisted::load(Arc::new(repo), "prefs", 0i64);
        value.set(5);
        assert_eq!(value.get(), 5);
    }

    #[test]
    fn writes_use_the_same_key() {
        let repo = Arc::new(InMemoryRepository::new());
        let first = Persisted::load(repo.clone(), "shared", 0u8);
        first.set(9);

        let reloaded = Persisted::load(repo.clone(), "shared", 0u8);
        assert_eq!(reloaded.get(), 9);

        repo.remove_value("shared").unwrap();
        assert_eq!(Persisted::load(repo, "shared", 1u8).get(), 1);
    }
}
