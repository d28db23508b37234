//! Orchestration of the working leads list.
//!
//! [`LeadsController`] fetches leads whenever pagination or preferences
//! change, and applies edits and conversions with snapshot/rollback
//! semantics. Shared state sits behind a mutex that is never held across an
//! `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::domain::lead::{Lead, LeadPreferences, LeadStatus, effective_status};
use crate::domain::opportunity::Opportunity;
use crate::domain::types::{LeadId, OpportunityId, TypeConstraintError, is_valid_email};
use crate::pagination::PaginationParams;
use crate::services::simulated::SimulatedLeadsApi;
use crate::services::{LeadsApi, LeadsQuery, ServiceError, ServiceResult};
use crate::store::opportunities::OpportunitiesConsumer;
use crate::store::preferences::PreferencesStore;

/// Lifecycle of the most recent fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// A lead paired with the status the UI should display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeadRow {
    #[serde(flatten)]
    pub lead: Lead,
    pub effective_status: LeadStatus,
}

/// Read-only copy of the controller state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeadsView {
    /// Working leads that match the current preferences, in display order.
    pub rows: Vec<LeadRow>,
    pub opportunities: Vec<Opportunity>,
    pub state: FetchState,
    pub has_more: bool,
    pub pagination: PaginationParams,
    pub preferences: LeadPreferences,
}

#[derive(Debug, Default)]
struct LeadsState {
    leads: Vec<Lead>,
    fetch: FetchState,
    has_more: bool,
    pagination: PaginationParams,
    /// Sequence number of the most recently issued fetch.
    issued: u64,
    /// Sequence number of the most recently applied response.
    applied: u64,
}

pub struct LeadsController<A = SimulatedLeadsApi> {
    api: A,
    preferences: PreferencesStore,
    opportunities: OpportunitiesConsumer,
    state: Mutex<LeadsState>,
}

impl<A: LeadsApi> LeadsController<A> {
    pub fn new(
        api: A,
        preferences: PreferencesStore,
        opportunities: OpportunitiesConsumer,
        pagination: PaginationParams,
    ) -> Self {
        Self {
            api,
            preferences,
            opportunities,
            state: Mutex::new(LeadsState {
                pagination,
                has_more: true,
                ..LeadsState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LeadsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn preferences(&self) -> LeadPreferences {
        self.preferences.get()
    }

    pub fn pagination(&self) -> PaginationParams {
        self.lock().pagination
    }

    pub fn fetch_state(&self) -> FetchState {
        self.lock().fetch.clone()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    /// Working copy of the fetched leads.
    pub fn leads(&self) -> Vec<Lead> {
        self.lock().leads.clone()
    }

    pub fn find_lead(&self, id: &LeadId) -> Option<Lead> {
        self.lock().leads.iter().find(|lead| &lead.id == id).cloned()
    }

    /// Fetches with the current pagination and preferences.
    pub async fn refresh(&self) -> ServiceResult<()> {
        let pagination = self.pagination();
        self.fetch(pagination).await
    }

    /// Fetches when nothing has been loaded yet.
    pub async fn ensure_loaded(&self) -> ServiceResult<()> {
        if self.fetch_state() == FetchState::Idle {
            self.refresh().await
        } else {
            Ok(())
        }
    }

    /// Fetches the leads covered by `pagination` using the stored preferences.
    ///
    /// Responses are tagged with a sequence number; a response that arrives
    /// after a newer one has been applied is dropped.
    pub async fn fetch(&self, pagination: PaginationParams) -> ServiceResult<()> {
        let query = LeadsQuery::new(pagination, self.preferences.get());
        let seq = {
            let mut state = self.lock();
            state.issued += 1;
            state.pagination = pagination;
            state.fetch = FetchState::Loading;
            state.issued
        };

        let result = self.api.get_leads(&query).await;

        let mut state = self.lock();
        if seq < state.applied {
            debug!(
                "Dropping stale leads response #{seq}, #{} already applied",
                state.applied
            );
            return Ok(());
        }
        state.applied = seq;
        let latest = seq == state.issued;

        match result {
            Ok(response) => {
                state.has_more = response.has_more();
                state.leads = response.data;
                if latest {
                    state.fetch = FetchState::Loaded;
                }
                Ok(())
            }
            Err(err) => {
                error!("Failed to fetch leads: {err}");
                state.fetch = FetchState::Error(err.to_string());
                Err(err)
            }
        }
    }

    /// Advances to the next page when more leads are available.
    ///
    /// Returns `false` without fetching when everything is already loaded.
    pub async fn load_more(&self) -> ServiceResult<bool> {
        let next = {
            let state = self.lock();
            if !state.has_more || state.fetch == FetchState::Loading {
                return Ok(false);
            }
            state.pagination.next()
        };
        self.fetch(next).await?;
        Ok(true)
    }

    /// Stores new preferences and refetches.
    pub async fn set_preferences(&self, preferences: LeadPreferences) -> ServiceResult<()> {
        self.preferences.set(preferences);
        self.refresh().await
    }

    /// Replaces the status filter and search query, keeping the sort
    /// direction, and refetches.
    pub async fn set_filters(
        &self,
        filter_status: Option<LeadStatus>,
        query: impl Into<String>,
    ) -> ServiceResult<()> {
        self.preferences.set_filter_status(filter_status);
        self.preferences.set_query(query);
        self.refresh().await
    }

    /// Flips the score sort direction and refetches.
    pub async fn toggle_sort(&self) -> ServiceResult<()> {
        self.preferences.toggle_sort();
        self.refresh().await
    }

    /// Saves an edited lead.
    ///
    /// The edit is applied to the working list before the call and rolled
    /// back to the prior snapshot if the save fails. A successful save with
    /// status `Converted` converts the lead; any other status drops the
    /// lead's opportunity.
    pub async fn save_lead(&self, updated: Lead) -> ServiceResult<()> {
        if !is_valid_email(&updated.email) {
            return Err(TypeConstraintError::InvalidEmail.into());
        }

        let snapshot = {
            let mut state = self.lock();
            let Some(position) = state.leads.iter().position(|lead| lead.id == updated.id) else {
                return Err(ServiceError::NotFound);
            };
            let snapshot = state.leads.clone();
            state.leads[position] = updated.clone();
            snapshot
        };

        if let Err(err) = self.api.save_lead(&updated).await {
            warn!("Rolling back lead {} after failed save: {err}", updated.id);
            self.lock().leads = snapshot;
            return Err(err);
        }

        if updated.status == LeadStatus::Converted {
            return self.convert_lead(&updated, None, None);
        }

        let opportunity_id = OpportunityId::from_lead(&updated.id);
        if self.opportunities.remove_opportunity(&opportunity_id)? {
            info!("Lead {} left Converted, removed {opportunity_id}", updated.id);
        }
        Ok(())
    }

    /// Turns `lead` into an opportunity and marks it `Converted`.
    ///
    /// Does nothing when the working copy is already converted and its
    /// opportunity exists. `account_name` defaults to the lead email.
    pub fn convert_lead(
        &self,
        lead: &Lead,
        account_name: Option<&str>,
        amount: Option<f64>,
    ) -> ServiceResult<()> {
        let opportunity_id = OpportunityId::from_lead(&lead.id);
        let exists = self.opportunities.find(&opportunity_id)?.is_some();
        let already_converted = self
            .lock()
            .leads
            .iter()
            .any(|existing| existing.id == lead.id && existing.status == LeadStatus::Converted);

        if already_converted && exists {
            debug!("Lead {} is already converted", lead.id);
            return Ok(());
        }

        if !exists {
            self.opportunities
                .add_opportunity(Opportunity::from_lead(lead, account_name, amount))?;
            info!("Converted lead {} into {opportunity_id}", lead.id);
        }

        let mut state = self.lock();
        for existing in state.leads.iter_mut().filter(|existing| existing.id == lead.id) {
            existing.status = LeadStatus::Converted;
        }
        Ok(())
    }

    /// Builds the view shown by the UI.
    ///
    /// The working list is filtered and sorted with the current preferences
    /// so local edits are reflected before the next fetch.
    pub fn snapshot(&self) -> ServiceResult<LeadsView> {
        let preferences = self.preferences.get();
        let opportunities = self.opportunities.opportunities()?;
        let state = self.lock();

        let mut leads: Vec<Lead> = state
            .leads
            .iter()
            .filter(|lead| preferences.matches(lead))
            .cloned()
            .collect();
        preferences.sort(&mut leads);

        let rows = leads
            .into_iter()
            .map(|lead| LeadRow {
                effective_status: effective_status(&lead, &opportunities),
                lead,
            })
            .collect();

        Ok(LeadsView {
            rows,
            opportunities,
            state: state.fetch.clone(),
            has_more: state.has_more,
            pagination: state.pagination,
            preferences,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::rt::time::sleep;

    use super::*;
    use crate::pagination::PaginatedResponse;
    use crate::repository::memory::InMemoryRepository;
    use crate::services::LeadsResponse;
    use crate::store::StoreError;
    use crate::store::opportunities::OpportunitiesProvider;

    /// Scriptable API: per-page latency, save outcome and call counters.
    #[derive(Clone, Default)]
    struct ScriptedApi {
        dataset: Vec<Lead>,
        fail_saves: Rc<Cell<bool>>,
        fail_fetches: Rc<Cell<bool>>,
        saves: Rc<Cell<usize>>,
        page_delays: Rc<RefCell<Vec<(usize, Duration)>>>,
    }

    impl ScriptedApi {
        fn new(dataset: Vec<Lead>) -> Self {
            Self {
                dataset,
                ..Self::default()
            }
        }
    }

    impl LeadsApi for ScriptedApi {
        async fn get_leads(&self, query: &LeadsQuery) -> ServiceResult<LeadsResponse> {
            let delay = self
                .page_delays
                .borrow()
                .iter()
                .find(|(page, _)| *page == query.pagination.page)
                .map(|(_, delay)| *delay);
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            if self.fail_fetches.get() {
                return Err(ServiceError::Transport("Failed to GET leads".into()));
            }
            let total = self.dataset.len();
            let mut data = self.dataset.clone();
            data.truncate(query.pagination.visible_len(total));
            Ok(PaginatedResponse { data, total })
        }

        async fn save_lead(&self, _lead: &Lead) -> ServiceResult<()> {
            self.saves.set(self.saves.get() + 1);
            if self.fail_saves.get() {
                Err(ServiceError::Transport("Failed to save lead".into()))
            } else {
                Ok(())
            }
        }
    }

    fn lead(n: usize, score: i32, status: LeadStatus) -> Lead {
        Lead {
            id: LeadId::new(format!("L-{n}")).unwrap(),
            name: format!("Lead {n}"),
            company: "Initech".into(),
            email: format!("lead{n}@example.com"),
            source: "Web".into(),
            score,
            status,
        }
    }

    fn dataset() -> Vec<Lead> {
        vec![
            lead(1, 50, LeadStatus::New),
            lead(2, 40, LeadStatus::Qualified),
            lead(3, 30, LeadStatus::Contacted),
        ]
    }

    fn controller(
        api: ScriptedApi,
        page_size: usize,
    ) -> (LeadsController<ScriptedApi>, OpportunitiesProvider) {
        let repo = Arc::new(InMemoryRepository::new());
        let provider = OpportunitiesProvider::new(repo.clone());
        let controller = LeadsController::new(
            api,
            PreferencesStore::new(repo),
            provider.consumer(),
            PaginationParams::new(1, page_size),
        );
        (controller, provider)
    }

    fn opp_id(n: usize) -> OpportunityId {
        OpportunityId::new(format!("O-{n}")).unwrap()
    }

    #[actix_web::test]
    async fn fetch_loads_leads_and_has_more() {
        let (controller, _provider) = controller(ScriptedApi::new(dataset()), 2);
        assert_eq!(controller.fetch_state(), FetchState::Idle);

        controller.ensure_loaded().await.unwrap();
        assert_eq!(controller.fetch_state(), FetchState::Loaded);
        assert_eq!(controller.leads().len(), 2);
        assert!(controller.has_more());

        assert!(controller.load_more().await.unwrap());
        assert_eq!(controller.leads().len(), 3);
        assert_eq!(controller.pagination().page, 2);
        assert!(!controller.has_more());
        assert!(!controller.load_more().await.unwrap());
    }

    #[actix_web::test]
    async fn fetch_failure_records_error_state() {
        let api = ScriptedApi::new(dataset());
        api.fail_fetches.set(true);
        let (controller, _provider) = controller(api, 20);

        let err = controller.refresh().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to GET leads");
        assert_eq!(
            controller.fetch_state(),
            FetchState::Error("Failed to GET leads".into())
        );
    }

    #[actix_web::test]
    async fn stale_response_is_discarded() {
        let api = ScriptedApi::new(dataset());
        api.page_delays
            .borrow_mut()
            .push((1, Duration::from_millis(50)));
        let (controller, _provider) = controller(api, 1);
        let controller = Rc::new(controller);

        let slow = {
            let controller = controller.clone();
            actix_web::rt::spawn(async move { controller.fetch(PaginationParams::new(1, 1)).await })
        };
        sleep(Duration::from_millis(5)).await;
        controller.fetch(PaginationParams::new(3, 1)).await.unwrap();
        slow.await.unwrap().unwrap();

        assert_eq!(controller.leads().len(), 3);
        assert_eq!(controller.pagination().page, 3);
        assert_eq!(controller.fetch_state(), FetchState::Loaded);
    }

    #[actix_web::test]
    async fn invalid_email_is_rejected_before_saving() {
        let api = ScriptedApi::new(dataset());
        let saves = api.saves.clone();
        let (controller, _provider) = controller(api, 20);
        controller.refresh().await.unwrap();

        let mut edited = controller.find_lead(&LeadId::new("L-1").unwrap()).unwrap();
        edited.email = "bad-email".into();
        let err = controller.save_lead(edited).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid email format");
        assert_eq!(saves.get(), 0);
    }

    #[actix_web::test]
    async fn failed_save_restores_snapshot() {
        let api = ScriptedApi::new(dataset());
        api.fail_saves.set(true);
        let (controller, provider) = controller(api, 20);
        controller.refresh().await.unwrap();
        let before = controller.leads();

        let mut edited = before[1].clone();
        edited.email = "new@example.com".into();
        edited.status = LeadStatus::Converted;
        let err = controller.save_lead(edited).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to save lead");
        assert_eq!(controller.leads(), before);
        assert!(provider.consumer().opportunities().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn successful_save_replaces_lead() {
        let (controller, _provider) = controller(ScriptedApi::new(dataset()), 20);
        controller.refresh().await.unwrap();

        let mut edited = controller.leads()[2].clone();
        edited.status = LeadStatus::Lost;
        controller.save_lead(edited.clone()).await.unwrap();

        assert_eq!(controller.find_lead(&edited.id), Some(edited));
    }

    #[actix_web::test]
    async fn unknown_lead_cannot_be_saved() {
        let (controller, _provider) = controller(ScriptedApi::new(dataset()), 20);
        controller.refresh().await.unwrap();

        let err = controller
            .save_lead(lead(99, 1, LeadStatus::New))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[actix_web::test]
    async fn saving_as_converted_creates_opportunity() {
        let (controller, provider) = controller(ScriptedApi::new(dataset()), 20);
        controller.refresh().await.unwrap();

        let mut edited = controller.find_lead(&LeadId::new("L-2").unwrap()).unwrap();
        edited.status = LeadStatus::Converted;
        controller.save_lead(edited).await.unwrap();

        let opportunities = provider.consumer().opportunities().unwrap();
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].id, opp_id(2));
        assert_eq!(opportunities[0].account_name, "lead2@example.com");
    }

    #[actix_web::test]
    async fn saving_away_from_converted_removes_opportunity() {
        let (controller, provider) = controller(ScriptedApi::new(dataset()), 20);
        controller.refresh().await.unwrap();

        let lead = controller.find_lead(&LeadId::new("L-1").unwrap()).unwrap();
        controller.convert_lead(&lead, None, None).unwrap();
        assert!(provider.consumer().find(&opp_id(1)).unwrap().is_some());

        let mut reverted = controller.find_lead(&lead.id).unwrap();
        assert_eq!(reverted.status, LeadStatus::Converted);
        reverted.status = LeadStatus::Qualified;
        controller.save_lead(reverted).await.unwrap();

        assert!(provider.consumer().find(&opp_id(1)).unwrap().is_none());
        assert_eq!(
            controller.find_lead(&lead.id).unwrap().status,
            LeadStatus::Qualified
        );
    }

    #[actix_web::test]
    async fn convert_lead_is_idempotent() {
        let (controller, provider) = controller(ScriptedApi::new(dataset()), 20);
        controller.refresh().await.unwrap();
        let lead = controller.find_lead(&LeadId::new("L-3").unwrap()).unwrap();

        controller.convert_lead(&lead, Some("Initech"), Some(2500.0)).unwrap();
        controller.convert_lead(&lead, None, None).unwrap();

        let opportunities = provider.consumer().opportunities().unwrap();
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].account_name, "Initech");
        assert_eq!(opportunities[0].amount, Some(2500.0));

        let statuses: Vec<LeadStatus> = controller.leads().iter().map(|l| l.status).collect();
        assert_eq!(
            statuses,
            vec![LeadStatus::New, LeadStatus::Qualified, LeadStatus::Converted]
        );
    }

    #[actix_web::test]
    async fn convert_fails_loudly_without_provider() {
        let (controller, provider) = controller(ScriptedApi::new(dataset()), 20);
        controller.refresh().await.unwrap();
        drop(provider);

        let lead = controller.leads()[0].clone();
        let err = controller.convert_lead(&lead, None, None).unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::OutOfScope)));
    }

    #[actix_web::test]
    async fn snapshot_applies_preferences_and_effective_status() {
        let (controller, provider) = controller(ScriptedApi::new(dataset()), 20);
        controller.refresh().await.unwrap();

        let lead = controller.find_lead(&LeadId::new("L-1").unwrap()).unwrap();
        provider
            .consumer()
            .add_opportunity(Opportunity::from_lead(&lead, None, None))
            .unwrap();

        controller
            .set_preferences(LeadPreferences {
                sort_desc: false,
                filter_status: None,
                query: String::new(),
            })
            .await
            .unwrap();

        let view = controller.snapshot().unwrap();
        let ids: Vec<&str> = view.rows.iter().map(|row| row.lead.id.as_str()).collect();
        assert_eq!(ids, vec!["L-3", "L-2", "L-1"]);
        assert_eq!(view.rows[2].lead.status, LeadStatus::New);
        assert_eq!(view.rows[2].effective_status, LeadStatus::Converted);
        assert_eq!(view.opportunities.len(), 1);
        assert!(!view.preferences.sort_desc);
    }
}
