//! View models rendered by the index template.

use serde::Serialize;

use crate::domain::lead::{LeadPreferences, LeadStatus};
use crate::domain::opportunity::Opportunity;
use crate::pagination::PaginationParams;
use crate::services::leads::{FetchState, LeadRow, LeadsView};

const NEUTRAL_BADGE: &str = "badge-neutral";

/// CSS class of the badge shown for a lead status or opportunity stage.
pub fn status_badge_class(status: &str) -> &'static str {
    match status {
        "New" | "Prospecting" => "badge-blue",
        "Contacted" | "Needs Analysis" => "badge-yellow",
        "Qualified" | "Proposal" => "badge-green",
        "Lost" => "badge-red",
        "Converted" | "Negotiation" => "badge-purple",
        "Closed" => "badge-gray",
        _ => NEUTRAL_BADGE,
    }
}

#[derive(Debug, Serialize)]
pub struct LeadRowData {
    pub id: String,
    pub name: String,
    pub company: String,
    pub email: String,
    pub source: String,
    pub score: i32,
    /// Stored status, used to prefill the editor.
    pub stored_status: LeadStatus,
    /// Status after reconciling with the opportunities list.
    pub status: LeadStatus,
    pub badge_class: &'static str,
}

impl From<LeadRow> for LeadRowData {
    fn from(row: LeadRow) -> Self {
        Self {
            badge_class: status_badge_class(row.effective_status.as_str()),
            id: row.lead.id.into(),
            name: row.lead.name,
            company: row.lead.company,
            email: row.lead.email,
            source: row.lead.source,
            score: row.lead.score,
            stored_status: row.lead.status,
            status: row.effective_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OpportunityRowData {
    pub id: String,
    pub name: String,
    pub account_name: String,
    pub stage: String,
    pub badge_class: &'static str,
    /// Formatted amount, `-` when missing or zero.
    pub amount: String,
}

impl From<Opportunity> for OpportunityRowData {
    fn from(opportunity: Opportunity) -> Self {
        let amount = match opportunity.amount {
            Some(amount) if amount != 0.0 => format!("${amount}"),
            _ => "-".to_string(),
        };
        Self {
            badge_class: status_badge_class(opportunity.stage.as_str()),
            stage: opportunity.stage.to_string(),
            id: opportunity.id.into(),
            name: opportunity.name,
            account_name: opportunity.account_name,
            amount,
        }
    }
}

/// Data required to render the main index template.
#[derive(Debug, Serialize)]
pub struct IndexPageData {
    pub leads: Vec<LeadRowData>,
    pub opportunities: Vec<OpportunityRowData>,
    /// Lead opened in the detail editor, if any.
    pub selected: Option<LeadRowData>,
    pub preferences: LeadPreferences,
    pub pagination: PaginationParams,
    pub has_more: bool,
    pub loading: bool,
    /// Page-level error of the last fetch.
    pub error: Option<String>,
}

impl IndexPageData {
    pub fn from_view(view: LeadsView, selected: Option<LeadRow>) -> Self {
        let (loading, error) = match view.state {
            FetchState::Loading => (true, None),
            FetchState::Error(message) => (false, Some(message)),
            FetchState::Idle | FetchState::Loaded => (false, None),
        };

        Self {
            leads: view.rows.into_iter().map(LeadRowData::from).collect(),
            opportunities: view
                .opportunities
                .into_iter()
                .map(OpportunityRowData::from)
                .collect(),
            selected: selected.map(LeadRowData::from),
            preferences: view.preferences,
            pagination: view.pagination,
            has_more: view.has_more,
            loading,
            error,
        }
    }
}
