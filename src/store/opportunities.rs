//! Process-wide opportunities list.
//!
//! The [`OpportunitiesProvider`] owns the persisted list and hands out
//! [`OpportunitiesConsumer`] handles. A consumer only works while its provider
//! is alive; afterwards every operation fails with [`StoreError::OutOfScope`].

use std::sync::{Arc, Weak};

use log::debug;

use crate::domain::opportunity::Opportunity;
use crate::domain::types::OpportunityId;
use crate::repository::KeyValueStore;
use crate::store::persisted::Persisted;
use crate::store::{StoreError, StoreResult};

/// Storage key of the opportunities array.
pub const OPPORTUNITIES_KEY: &str = "user:opps";

type OpportunityList = Persisted<Vec<Opportunity>>;

pub struct OpportunitiesProvider {
    list: Arc<OpportunityList>,
}

impl OpportunitiesProvider {
    /// Loads the persisted list from `repo`.
    pub fn new(repo: Arc<dyn KeyValueStore>) -> Self {
        Self {
            list: Arc::new(Persisted::load(repo, OPPORTUNITIES_KEY, Vec::new())),
        }
    }

    /// Returns a handle bound to this provider.
    pub fn consumer(&self) -> OpportunitiesConsumer {
        OpportunitiesConsumer {
            list: Arc::downgrade(&self.list),
        }
    }
}

#[derive(Clone)]
pub struct OpportunitiesConsumer {
    list: Weak<OpportunityList>,
}

impl OpportunitiesConsumer {
    /// A handle that was never bound to a provider.
    pub fn unbound() -> Self {
        Self { list: Weak::new() }
    }

    fn scope(&self) -> StoreResult<Arc<OpportunityList>> {
        self.list.upgrade().ok_or(StoreError::OutOfScope)
    }

    /// Current list in insertion order.
    pub fn opportunities(&self) -> StoreResult<Vec<Opportunity>> {
        Ok(self.scope()?.get())
    }

    pub fn find(&self, id: &OpportunityId) -> StoreResult<Option<Opportunity>> {
        Ok(self
            .scope()?
            .get()
            .into_iter()
            .find(|opportunity| &opportunity.id == id))
    }

    /// Appends `opportunity` to the list.
    pub fn add_opportunity(&self, opportunity: Opportunity) -> StoreResult<()> {
        debug!("Adding opportunity {}", opportunity.id);
        self.scope()?.update(|list| list.push(opportunity));
        Ok(())
    }

    /// Removes every opportunity with `id`. Returns whether anything was removed.
    pub fn remove_opportunity(&self, id: &OpportunityId) -> StoreResult<bool> {
        let removed = self.scope()?.update(|list| {
            let before = list.len();
            list.retain(|opportunity| &opportunity.id != id);
            list.len() != before
        });
        if removed {
            debug!("Removed opportunity {id}");
        }
        Ok(removed)
    }
}
