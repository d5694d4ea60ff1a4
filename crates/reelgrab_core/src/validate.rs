use crate::error::{OrchestrationError, EMPTY_URL_MESSAGE};

/// Rejects empty or whitespace-only input; anything else passes through untouched.
pub fn validate_url(raw: &str) -> Result<&str, OrchestrationError> {
    if raw.trim().is_empty() {
        return Err(OrchestrationError::validation(EMPTY_URL_MESSAGE));
    }
    Ok(raw)
}
