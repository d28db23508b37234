use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::lead::Lead;
use crate::domain::types::OpportunityId;

/// Sales-pipeline stage of an opportunity.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OpportunityStage {
    #[default]
    Prospecting,
    #[serde(rename = "Needs Analysis")]
    NeedsAnalysis,
    Proposal,
    Negotiation,
    Closed,
}

impl OpportunityStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            OpportunityStage::Prospecting => "Prospecting",
            OpportunityStage::NeedsAnalysis => "Needs Analysis",
            OpportunityStage::Proposal => "Proposal",
            OpportunityStage::Negotiation => "Negotiation",
            OpportunityStage::Closed => "Closed",
        }
    }
}

impl Display for OpportunityStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline record created when a lead converts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: OpportunityId,
    pub name: String,
    pub account_name: String,
    pub stage: OpportunityStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl Opportunity {
    /// Builds the opportunity for a converted lead.
    ///
    /// A blank or missing `account_name` falls back to the lead email.
    pub fn from_lead(lead: &Lead, account_name: Option<&str>, amount: Option<f64>) -> Self {
        let account_name = account_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&lead.email)
            .to_string();

        Self {
            id: OpportunityId::from_lead(&lead.id),
            name: lead.name.clone(),
            account_name,
            stage: OpportunityStage::Prospecting,
            amount,
        }
    }
}
