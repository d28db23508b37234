//! Key-value persistence for user state.
//!
//! Values are opaque strings keyed by name; callers own the serialization
//! format. [`DieselRepository`] stores them in SQLite, while
//! [`memory::InMemoryRepository`] keeps them in process memory.

use crate::db::{DbConnection, DbPool, get_connection};
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod kv;
pub mod memory;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub trait KeyValueReader {
    /// Returns the raw value stored under `key`, if any.
    fn get_value(&self, key: &str) -> RepositoryResult<Option<String>>;
}

pub trait KeyValueWriter {
    /// Stores `value` under `key`, replacing any previous value.
    fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()>;
    /// Removes `key`. Missing keys are not an error.
    fn remove_value(&self, key: &str) -> RepositoryResult<()>;
}

/// Object-safe bundle of the reader and writer traits shared between stores.
pub trait KeyValueStore: KeyValueReader + KeyValueWriter + Send + Sync {}

impl<T> KeyValueStore for T where T: KeyValueReader + KeyValueWriter + Send + Sync {}

/// Diesel-backed repository over the SQLite connection pool.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}
