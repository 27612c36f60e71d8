//! Upscale / variation button codes.
//!
//! A button code selects a derivative action on one of the four images of
//! an existing job: `U1`..`U4` upscale, `V1`..`V4` create a variation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;

/// Pattern every accepted button code must match.
pub const BUTTON_CODE_PATTERN: &str = r"^[UV][1-4]$";

static BUTTON_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BUTTON_CODE_PATTERN).expect("valid regex"));

/// Label for `U*` codes.
pub const LABEL_UPSCALE: &str = "Upscale";
/// Label for every other code.
pub const LABEL_VARIATION: &str = "Variation";

/// A validated button code such as `U2` or `V4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ButtonCode(String);

impl ButtonCode {
    /// Parse and validate a button code. Surrounding whitespace is ignored;
    /// case is not (the remote only accepts upper case).
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let code = raw.trim();
        if BUTTON_CODE_RE.is_match(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(CoreError::Validation(format!(
                "Invalid button '{code}'. Expected U1-U4 (upscale) or V1-V4 (variation)"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ButtonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a button code to its action label: codes starting with `U` are
/// upscales, everything else is a variation.
pub fn describe(button_code: &str) -> &'static str {
    if button_code.starts_with('U') {
        LABEL_UPSCALE
    } else {
        LABEL_VARIATION
    }
}

/// Build the description stored as the derived job's prompt, e.g.
/// `"Upscale (U2) of: a red fox"`.
pub fn action_prompt(button_code: &str, original_prompt: &str) -> String {
    format!(
        "{} ({button_code}) of: {original_prompt}",
        describe(button_code)
    )
}
