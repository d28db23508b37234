//! DTOs exposed by the JSON API endpoints.

use serde::Deserialize;

/// Query parameters accepted by `/api/v1/leads`.
#[derive(Debug, Default, Deserialize)]
pub struct LeadsApiQuery {
    /// 1-based page, defaults to the first page.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    /// Exact status name to filter by; blank means all statuses.
    pub filter_status: Option<String>,
    /// Sort by score descending; ascending when omitted.
    pub sort_desc: Option<bool>,
    /// Case-insensitive substring matched against name and company.
    pub query: Option<String>,
}
