//! Database and configuration models.

#[cfg(feature = "server")]
pub mod config;
pub mod kv_entry;
