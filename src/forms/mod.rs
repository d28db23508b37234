//! HTML form payloads and their validation.

use validator::ValidationErrors;

pub mod leads;

/// Collects the human-readable messages of a failed validation.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .map(|error| match &error.message {
            Some(message) => message.to_string(),
            None => format!("Invalid value ({})", error.code),
        })
        .collect();
    messages.sort();
    messages.dedup();

    if messages.is_empty() {
        "Invalid form".to_string()
    } else {
        messages.join("; ")
    }
}
