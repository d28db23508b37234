//! Loader for the static leads dataset served by the simulated API.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::domain::lead::Lead;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate lead id `{0}`")]
    DuplicateId(String),
}

/// Parses a JSON array of leads, rejecting duplicated identifiers.
pub fn parse_leads(raw: &str) -> Result<Vec<Lead>, DatasetError> {
    let leads: Vec<Lead> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(leads.len());
    for lead in &leads {
        if !seen.insert(lead.id.as_str()) {
            return Err(DatasetError::DuplicateId(lead.id.to_string()));
        }
    }

    Ok(leads)
}

/// Reads and parses the dataset file at `path`.
pub fn load_leads(path: impl AsRef<Path>) -> Result<Vec<Lead>, DatasetError> {
    let raw = fs::read_to_string(path)?;
    parse_leads(&raw)
}
