//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::pagination::DEFAULT_PAGE_SIZE;

fn default_simulated_latency_ms() -> u64 {
    1000
}

fn default_failure_rate() -> f64 {
    0.3
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Path to the JSON file holding the full leads dataset.
    pub leads_dataset: String,
    /// Key material for signing flash-message cookies (at least 64 bytes).
    pub secret: String,
    /// Artificial delay applied by the simulated leads API.
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
    /// Probability in `[0, 1]` that a simulated save fails.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}
