//! Services behind the JSON API.

use crate::domain::lead::{LeadPreferences, LeadStatus};
use crate::domain::opportunity::Opportunity;
use crate::dto::api::LeadsApiQuery;
use crate::pagination::{DEFAULT_PAGE_SIZE, PaginationParams};
use crate::services::{LeadsApi, LeadsQuery, LeadsResponse, ServiceResult};
use crate::store::opportunities::OpportunitiesConsumer;

/// Lists leads straight from the leads API, independent of the page state.
pub async fn list_leads<A>(api: &A, params: LeadsApiQuery) -> ServiceResult<LeadsResponse>
where
    A: LeadsApi,
{
    let filter_status = match params
        .filter_status
        .as_deref()
        .map(str::trim)
        .filter(|status| !status.is_empty())
    {
        Some(status) => Some(status.parse::<LeadStatus>()?),
        None => None,
    };

    let query = LeadsQuery::new(
        PaginationParams::new(
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        ),
        LeadPreferences {
            sort_desc: params.sort_desc.unwrap_or(false),
            filter_status,
            query: params.query.unwrap_or_default(),
        },
    );

    api.get_leads(&query).await
}

/// Returns every stored opportunity.
pub fn list_opportunities(consumer: &OpportunitiesConsumer) -> ServiceResult<Vec<Opportunity>> {
    Ok(consumer.opportunities()?)
}
