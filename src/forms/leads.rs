use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::lead::LeadStatus;
use crate::domain::types::is_valid_email;

fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message(Cow::Borrowed("Invalid email format")))
    }
}

fn validate_draft_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        Ok(())
    } else {
        validate_email_format(email)
    }
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<LeadStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("status").with_message(Cow::Borrowed("Unknown status")))
}

fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    let amount = amount.trim();
    if amount.is_empty() || amount.parse::<f64>().is_ok_and(|value| value.is_finite() && value >= 0.0)
    {
        Ok(())
    } else {
        Err(ValidationError::new("amount").with_message(Cow::Borrowed("Invalid amount")))
    }
}

#[derive(Deserialize, Validate)]
/// Edits submitted from the lead detail editor.
pub struct SaveLeadForm {
    /// Lead identifier.
    pub id: String,
    #[validate(custom(function = "validate_email_format"))]
    pub email: String,
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

#[derive(Deserialize, Validate)]
/// Request to convert a lead into an opportunity.
pub struct ConvertLeadForm {
    pub id: String,
    /// Email currently typed in the editor, saved or not.
    #[serde(default)]
    #[validate(custom(function = "validate_draft_email"))]
    pub email: Option<String>,
    /// Account of the new opportunity; the lead email when blank.
    #[serde(default)]
    #[validate(length(max = 200))]
    pub account_name: Option<String>,
    /// Optional deal size, kept as text so a blank input is accepted.
    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub amount: Option<String>,
}

impl ConvertLeadForm {
    /// Non-blank editor email, if one was submitted.
    pub fn draft_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    /// Parsed amount; blank input means no amount.
    pub fn amount(&self) -> Option<f64> {
        self.amount
            .as_deref()
            .map(str::trim)
            .filter(|amount| !amount.is_empty())
            .and_then(|amount| amount.parse().ok())
    }
}

#[derive(Deserialize)]
/// Filter bar submission.
pub struct PreferencesForm {
    #[serde(default)]
    pub query: String,
    /// Status name, or blank for all statuses.
    #[serde(default)]
    pub filter_status: String,
}

impl PreferencesForm {
    /// Parsed status filter; blank or unknown values clear the filter.
    pub fn filter_status(&self) -> Option<LeadStatus> {
        let status = self.filter_status.trim();
        if status.is_empty() {
            return None;
        }
        status.parse().ok()
    }
}
