//! Long-lived stores for user state that survives restarts.
//!
//! Each store wraps one key of a [`crate::repository::KeyValueStore`] through
//! [`persisted::Persisted`]. Stores are created once at start-up and handed to
//! their consumers explicitly.

use thiserror::Error;

pub mod opportunities;
pub mod persisted;
pub mod preferences;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store was used after its provider was dropped, or was never bound.
    #[error("opportunities store used outside of its provider scope")]
    OutOfScope,
}

pub type StoreResult<T> = Result<T, StoreError>;
