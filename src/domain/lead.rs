use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::opportunity::Opportunity;
use crate::domain::types::{LeadId, TypeConstraintError};

/// Qualification state of a lead.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
    Converted,
}

impl LeadStatus {
    /// Every status in the order the UI lists them.
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Lost,
        LeadStatus::Converted,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Lost => "Lost",
            LeadStatus::Converted => "Converted",
        }
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown lead status `{s}`")))
    }
}

/// Prospective customer record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub company: String,
    pub email: String,
    pub source: String,
    pub score: i32,
    pub status: LeadStatus,
}

/// User-controlled view settings persisted across sessions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeadPreferences {
    pub sort_desc: bool,
    pub filter_status: Option<LeadStatus>,
    #[serde(default)]
    pub query: String,
}

impl Default for LeadPreferences {
    fn default() -> Self {
        Self {
            sort_desc: true,
            filter_status: None,
            query: String::new(),
        }
    }
}

impl LeadPreferences {
    /// Returns `true` when the lead passes both the text query and the status filter.
    ///
    /// The query is matched case-insensitively as a substring of the name or
    /// the company; a blank query matches everything.
    pub fn matches(&self, lead: &Lead) -> bool {
        let query = self.query.trim().to_lowercase();
        let matches_query = query.is_empty()
            || lead.name.to_lowercase().contains(&query)
            || lead.company.to_lowercase().contains(&query);
        let matches_status = self
            .filter_status
            .is_none_or(|status| lead.status == status);

        matches_query && matches_status
    }

    /// Stable sort by score in the configured direction.
    pub fn sort(&self, leads: &mut [Lead]) {
        if self.sort_desc {
            leads.sort_by(|a, b| b.score.cmp(&a.score));
        } else {
            leads.sort_by(|a, b| a.score.cmp(&b.score));
        }
    }
}

/// Status shown for `lead` once reconciled with the opportunities list.
///
/// A lead whose email is the account of any opportunity is displayed as
/// converted regardless of its stored status.
pub fn effective_status(lead: &Lead, opportunities: &[Opportunity]) -> LeadStatus {
    if opportunities
        .iter()
        .any(|opportunity| opportunity.account_name == lead.email)
    {
        LeadStatus::Converted
    } else {
        lead.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::opportunity::OpportunityStage;
    use crate::domain::types::OpportunityId;

    fn lead(id: &str, name: &str, company: &str, score: i32, status: LeadStatus) -> Lead {
        Lead {
            id: LeadId::new(id).unwrap(),
            name: name.into(),
            company: company.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            source: "Web".into(),
            score,
            status,
        }
    }

    #[test]
    fn status_parses_display_form() {
        for status in LeadStatus::ALL {
            assert_eq!(status.to_string().parse::<LeadStatus>().unwrap(), status);
        }
        assert!("Won".parse::<LeadStatus>().is_err());
    }

    #[test]
    fn status_serializes_by_name() {
        assert_eq!(
            serde_json::to_string(&LeadStatus::Qualified).unwrap(),
            "\"Qualified\""
        );
    }

    #[test]
    fn query_matches_name_or_company_ignoring_case() {
        let prefs = LeadPreferences {
            query: "ACME".into(),
            ..LeadPreferences::default()
        };
        assert!(prefs.matches(&lead("L-1", "Ann", "Acme Corp", 1, LeadStatus::New)));
        assert!(!prefs.matches(&lead("L-2", "Bob", "Globex", 1, LeadStatus::New)));

        let prefs = LeadPreferences {
            query: "bo".into(),
            ..LeadPreferences::default()
        };
        assert!(prefs.matches(&lead("L-2", "Bob", "Globex", 1, LeadStatus::New)));
    }

    #[test]
    fn status_filter_requires_exact_match() {
        let prefs = LeadPreferences {
            filter_status: Some(LeadStatus::Lost),
            ..LeadPreferences::default()
        };
        assert!(prefs.matches(&lead("L-1", "Ann", "Acme", 1, LeadStatus::Lost)));
        assert!(!prefs.matches(&lead("L-2", "Bob", "Acme", 1, LeadStatus::New)));
    }

    #[test]
    fn preferences_use_camel_case_keys() {
        let json = serde_json::to_value(LeadPreferences::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "sortDesc": true, "filterStatus": null, "query": "" })
        );
    }

    #[test]
    fn effective_status_prefers_matching_opportunity() {
        let ann = lead("L-1", "Ann", "Acme", 1, LeadStatus::Qualified);
        let opportunity = Opportunity {
            id: OpportunityId::from_lead(&ann.id),
            name: ann.name.clone(),
            account_name: ann.email.clone(),
            stage: OpportunityStage::Prospecting,
            amount: None,
        };

        assert_eq!(effective_status(&ann, &[]), LeadStatus::Qualified);
        assert_eq!(effective_status(&ann, &[opportunity]), LeadStatus::Converted);
    }
}
