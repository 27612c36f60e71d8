//! Prompt validation for new generation requests.

use crate::error::CoreError;

/// Trim a prompt and check it against the configured maximum length.
///
/// Length is counted in characters, not bytes. Returns the trimmed prompt
/// that should be sent to the remote service.
pub fn validate_prompt(raw: &str, max_length: usize) -> Result<String, CoreError> {
    let prompt = raw.trim();
    if prompt.is_empty() {
        return Err(CoreError::Validation("No prompt provided".to_string()));
    }

    let length = prompt.chars().count();
    if length > max_length {
        return Err(CoreError::Validation(format!(
            "Prompt too long (max {max_length} characters, got {length})"
        )));
    }

    Ok(prompt.to_string())
}
