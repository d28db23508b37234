//! Process-local repository used by tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::repository::errors::RepositoryResult;
use crate::repository::{KeyValueReader, KeyValueWriter};

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueReader for InMemoryRepository {
    fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }
}

impl KeyValueWriter for InMemoryRepository {
    fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_value(&self, key: &str) -> RepositoryResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
