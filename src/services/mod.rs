//! Service layer: the leads API seam, its simulated implementation and the
//! orchestration used by the HTTP routes.

use std::future::Future;

use thiserror::Error;

use crate::domain::lead::{Lead, LeadPreferences};
use crate::domain::types::TypeConstraintError;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::repository::errors::RepositoryError;
use crate::store::StoreError;

pub mod api;
pub mod leads;
pub mod main;
pub mod simulated;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected before reaching the leads API.
    #[error("{0}")]
    Validation(String),

    /// The leads API call failed.
    #[error("{0}")]
    Transport(String),

    #[error("Lead not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

/// Parameters of a leads list request: pagination merged with preferences.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeadsQuery {
    pub pagination: PaginationParams,
    pub preferences: LeadPreferences,
}

impl LeadsQuery {
    pub fn new(pagination: PaginationParams, preferences: LeadPreferences) -> Self {
        Self {
            pagination,
            preferences,
        }
    }
}

pub type LeadsResponse = PaginatedResponse<Vec<Lead>>;

/// Remote source of leads.
pub trait LeadsApi {
    /// Returns the cumulative page of leads matching `query` and the total count.
    fn get_leads(&self, query: &LeadsQuery) -> impl Future<Output = ServiceResult<LeadsResponse>>;

    /// Persists an edited lead.
    fn save_lead(&self, lead: &Lead) -> impl Future<Output = ServiceResult<()>>;
}
