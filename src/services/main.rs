//! Services behind the HTML pages.

use log::error;
use validator::Validate;

use crate::domain::lead::LeadStatus;
use crate::domain::types::{LeadEmail, LeadId};
use crate::dto::main::IndexPageData;
use crate::forms::leads::{ConvertLeadForm, PreferencesForm, SaveLeadForm};
use crate::forms::validation_message;
use crate::services::leads::{LeadRow, LeadsController};
use crate::services::{LeadsApi, ServiceError, ServiceResult};

/// Loads the leads page, fetching on first use.
///
/// A failed fetch is not an error here: it is reported through
/// [`IndexPageData::error`] so the page can show it.
pub async fn load_index_page<A>(
    controller: &LeadsController<A>,
    selected: Option<&str>,
) -> ServiceResult<IndexPageData>
where
    A: LeadsApi,
{
    match controller.ensure_loaded().await {
        Ok(()) | Err(ServiceError::Transport(_)) => {}
        Err(err) => return Err(err),
    }

    let view = controller.snapshot()?;

    let selected = match selected {
        Some(id) => {
            let id = LeadId::new(id)?;
            let lead = controller.find_lead(&id).ok_or(ServiceError::NotFound)?;
            let effective_status = view
                .rows
                .iter()
                .find(|row| row.lead.id == id)
                .map_or(lead.status, |row| row.effective_status);
            Some(LeadRow {
                lead,
                effective_status,
            })
        }
        None => None,
    };

    Ok(IndexPageData::from_view(view, selected))
}

/// Applies the detail editor form to the working copy and saves it.
pub async fn save_lead<A>(controller: &LeadsController<A>, form: SaveLeadForm) -> ServiceResult<()>
where
    A: LeadsApi,
{
    if let Err(err) = form.validate() {
        return Err(ServiceError::Validation(validation_message(&err)));
    }

    let id = LeadId::new(form.id)?;
    let mut updated = controller.find_lead(&id).ok_or(ServiceError::NotFound)?;
    updated.email = LeadEmail::new(form.email)?.into_inner();
    updated.status = form.status.parse::<LeadStatus>()?;

    controller.save_lead(updated).await.map_err(|err| {
        error!("Failed to save lead {id}: {err}");
        err
    })
}

/// Converts the lead named by the form, using the editor's draft email
/// when one was submitted.
pub fn convert_lead<A>(controller: &LeadsController<A>, form: ConvertLeadForm) -> ServiceResult<()>
where
    A: LeadsApi,
{
    if let Err(err) = form.validate() {
        return Err(ServiceError::Validation(validation_message(&err)));
    }

    let id = LeadId::new(form.id.as_str())?;
    let mut draft = controller.find_lead(&id).ok_or(ServiceError::NotFound)?;
    if let Some(email) = form.draft_email() {
        draft.email = LeadEmail::new(email)?.into_inner();
    }
    controller.convert_lead(&draft, form.account_name.as_deref(), form.amount())
}

/// Stores the filter bar values, keeping the sort direction, and refetches.
pub async fn update_preferences<A>(
    controller: &LeadsController<A>,
    form: PreferencesForm,
) -> ServiceResult<()>
where
    A: LeadsApi,
{
    controller
        .set_filters(form.filter_status(), form.query.trim())
        .await
}
