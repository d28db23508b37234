//! In-process stand-in for the remote leads API.
//!
//! Serves a fixed dataset after an artificial delay and fails saves at a
//! configurable rate.

use std::sync::Arc;
use std::time::Duration;

use actix_web::rt::time::sleep;
use log::{debug, warn};

use crate::domain::lead::Lead;
use crate::pagination::PaginatedResponse;
use crate::services::{LeadsApi, LeadsQuery, LeadsResponse, ServiceError, ServiceResult};

/// Delay every simulated call waits before answering.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(1000);
/// Probability that a simulated save fails.
pub const FAILURE_RATE: f64 = 0.3;

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save lead";

/// Returns `true` when `draw` falls below `rate`, i.e. the call fails.
pub fn fails_with(draw: f64, rate: f64) -> bool {
    draw < rate
}

/// Draws a uniform number in `[0, 1)` and decides whether the call fails.
pub fn simulate_failure(rate: f64) -> bool {
    fails_with(rand::random::<f64>(), rate)
}

#[derive(Clone, Debug)]
pub struct SimulatedLeadsApi {
    dataset: Arc<Vec<Lead>>,
    latency: Duration,
    failure_rate: f64,
}

impl SimulatedLeadsApi {
    pub fn new(dataset: Vec<Lead>) -> Self {
        Self {
            dataset: Arc::new(dataset),
            latency: SIMULATED_LATENCY,
            failure_rate: FAILURE_RATE,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Sets the failure rate, clamped to `[0, 1]`.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Filters, sorts and slices the dataset without any delay.
    ///
    /// `data` holds the first `page * page_size` matches, not an offset
    /// window, so successive pages grow the same prefix.
    pub fn query_leads(&self, query: &LeadsQuery) -> LeadsResponse {
        let mut leads: Vec<Lead> = self
            .dataset
            .iter()
            .filter(|lead| query.preferences.matches(lead))
            .cloned()
            .collect();
        query.preferences.sort(&mut leads);

        let total = leads.len();
        leads.truncate(query.pagination.visible_len(total));

        PaginatedResponse { data: leads, total }
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

impl LeadsApi for SimulatedLeadsApi {
    async fn get_leads(&self, query: &LeadsQuery) -> ServiceResult<LeadsResponse> {
        self.wait().await;
        let response = self.query_leads(query);
        debug!(
            "Serving {} of {} leads for page {}",
            response.data.len(),
            response.total,
            query.pagination.page
        );
        Ok(response)
    }

    async fn save_lead(&self, lead: &Lead) -> ServiceResult<()> {
        self.wait().await;
        if simulate_failure(self.failure_rate) {
            warn!("Simulated failure while saving lead {}", lead.id);
            return Err(ServiceError::Transport(SAVE_FAILED_MESSAGE.to_string()));
        }
        debug!("Saved lead {}", lead.id);
        Ok(())
    }
}
