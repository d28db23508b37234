//! Strongly-typed value objects used by domain entities.
//!
//! Identifiers are validated once at the boundary (dataset, forms, persisted
//! state) so the rest of the crate can treat them as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker that starts every lead identifier, e.g. `L-7`.
pub const LEAD_ID_PREFIX: &str = "L-";
/// Marker that starts every opportunity identifier, e.g. `O-7`.
pub const OPPORTUNITY_ID_PREFIX: &str = "O-";

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided email failed format validation.
    #[error("Invalid email format")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Local part, `@`, then a domain with at least one inner dot; no whitespace.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Checks that `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

macro_rules! string_id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Trims the value and rejects empty identifiers.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = value.into().trim().to_string();
                if trimmed.is_empty() {
                    return Err(TypeConstraintError::EmptyString);
                }
                Ok(Self(trimmed))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

string_id_newtype!(LeadId, "Stable identifier of a lead within the dataset.");
string_id_newtype!(
    OpportunityId,
    "Identifier of an opportunity, derived from the converted lead."
);

impl OpportunityId {
    /// Derives the opportunity identifier for the given lead.
    ///
    /// The leading lead marker is swapped for the opportunity marker
    /// (`L-7` becomes `O-7`). Identifiers without the marker are prefixed
    /// as a whole, so the mapping stays one-to-one.
    pub fn from_lead(lead_id: &LeadId) -> Self {
        let tail = lead_id
            .as_str()
            .strip_prefix(LEAD_ID_PREFIX)
            .unwrap_or(lead_id.as_str());
        Self(format!("{OPPORTUNITY_ID_PREFIX}{tail}"))
    }
}

/// Email address that passed [`is_valid_email`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LeadEmail(String);

impl LeadEmail {
    /// Trims and validates an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let trimmed = email.into().trim().to_string();
        if is_valid_email(&trimmed) {
            Ok(Self(trimmed))
        } else {
            Err(TypeConstraintError::InvalidEmail)
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_regular_addresses() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(is_valid_email("a@b.c"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "bad-email",
            "",
            "@example.com",
            "user@",
            "user@example",
            "user@.com",
            "user@example.",
            "user name@example.com",
            "user@@example.com",
            "user@exa@mple.com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn lead_email_reports_invalid_format() {
        assert_eq!(
            LeadEmail::new("bad-email").unwrap_err().to_string(),
            "Invalid email format"
        );
        assert_eq!(
            LeadEmail::new("  ok@example.com ").unwrap().into_inner(),
            "ok@example.com"
        );
    }

    #[test]
    fn opportunity_id_replaces_lead_marker() {
        let lead_id = LeadId::new("L-7").unwrap();
        assert_eq!(OpportunityId::from_lead(&lead_id).as_str(), "O-7");
    }

    #[test]
    fn opportunity_id_prefixes_unmarked_ids() {
        let lead_id = LeadId::new("42").unwrap();
        assert_eq!(OpportunityId::from_lead(&lead_id).as_str(), "O-42");
    }

    #[test]
    fn empty_ids_are_rejected() {
        assert_eq!(LeadId::new("   "), Err(TypeConstraintError::EmptyString));
        assert!(serde_json::from_str::<LeadId>("\"\"").is_err());
        assert_eq!(
            serde_json::from_str::<LeadId>("\"L-1\"").unwrap().as_str(),
            "L-1"
        );
    }
}
