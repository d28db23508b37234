//! Persisted view preferences (query, status filter, sort direction).

use std::sync::Arc;

use crate::domain::lead::{LeadPreferences, LeadStatus};
use crate::repository::KeyValueStore;
use crate::store::persisted::Persisted;

/// Storage key of the preferences object.
pub const PREFERENCES_KEY: &str = "user:prefs";

pub struct PreferencesStore {
    prefs: Persisted<LeadPreferences>,
}

impl PreferencesStore {
    pub fn new(repo: Arc<dyn KeyValueStore>) -> Self {
        Self {
            prefs: Persisted::load(repo, PREFERENCES_KEY, LeadPreferences::default()),
        }
    }

    pub fn get(&self) -> LeadPreferences {
        self.prefs.get()
    }

    pub fn set(&self, prefs: LeadPreferences) {
        self.prefs.set(prefs);
    }

    /// Flips the sort direction and returns the updated preferences.
    pub fn toggle_sort(&self) -> LeadPreferences {
        self.prefs.update(|prefs| {
            prefs.sort_desc = !prefs.sort_desc;
            prefs.clone()
        })
    }

    pub fn set_filter_status(&self, status: Option<LeadStatus>) -> LeadPreferences {
        self.prefs.update(|prefs| {
            prefs.filter_status = status;
            prefs.clone()
        })
    }

    pub fn set_query(&self, query: impl Into<String>) -> LeadPreferences {
        let query = query.into();
        self.prefs.update(|prefs| {
            prefs.query = query;
            prefs.clone()
        })
    }
}
