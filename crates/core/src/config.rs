//! Generation settings shared by every component.
//!
//! A [`GenerationConfig`] is built once (usually via
//! [`GenerationConfig::from_env`]) and handed to each component's
//! constructor. Nothing reads the process environment after startup.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// Default remote API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.imaginepro.ai/api/v1";

/// Default archive root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default maximum prompt length in characters.
pub const DEFAULT_MAX_PROMPT_LENGTH: usize = 1000;

/// Timeout applied to every remote call and every image download.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Server-side generation timeout hint sent with each imagine request.
pub const DEFAULT_REMOTE_TIMEOUT_HINT_SECS: u64 = 900;

/// Timeout for the account-info (credits) lookup.
pub const DEFAULT_CREDITS_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for talking to the remote service and archiving its output.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Bearer credential. `None` means every remote call fails with a
    /// configuration error instead of being attempted.
    pub api_key: Option<String>,
    /// Base URL of the remote API, without a trailing slash.
    pub base_url: String,
    /// Root directory holding one sub-directory per archived generation.
    pub output_dir: PathBuf,
    /// Maximum accepted prompt length (characters, after trimming).
    pub max_prompt_length: usize,
    /// Per-call timeout for remote requests and image downloads.
    pub request_timeout: Duration,
    /// Value of the `timeout` field sent with imagine requests.
    pub remote_timeout_hint_secs: u64,
    /// Per-call timeout for the account-info lookup.
    pub credits_timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_prompt_length: DEFAULT_MAX_PROMPT_LENGTH,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            remote_timeout_hint_secs: DEFAULT_REMOTE_TIMEOUT_HINT_SECS,
            credits_timeout: DEFAULT_CREDITS_TIMEOUT,
        }
    }
}

impl GenerationConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                              |
    /// |-----------------------|--------------------------------------|
    /// | `IMAGINEPRO_API_KEY`  | unset                                |
    /// | `IMAGINEPRO_BASE_URL` | `https://api.imaginepro.ai/api/v1`   |
    /// | `OUTPUT_DIR`          | `output`                             |
    /// | `MAX_PROMPT_LENGTH`   | `1000`                               |
    ///
    /// A missing or blank API key is not an error here; callers log a
    /// warning and requests fail individually.
    pub fn from_env() -> Result<Self, CoreError> {
        let api_key = std::env::var("IMAGINEPRO_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let base_url = std::env::var("IMAGINEPRO_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let output_dir =
            PathBuf::from(std::env::var("OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.into()));

        let max_prompt_length = match std::env::var("MAX_PROMPT_LENGTH") {
            Ok(raw) => parse_max_prompt_length(&raw)?,
            Err(_) => DEFAULT_MAX_PROMPT_LENGTH,
        };

        Ok(Self {
            api_key,
            base_url,
            output_dir,
            max_prompt_length,
            ..Self::default()
        })
    }

    /// Return the configured credential or a [`CoreError::Configuration`].
    pub fn require_api_key(&self) -> Result<&str, CoreError> {
        self.api_key.as_deref().ok_or_else(|| {
            CoreError::Configuration(
                "API key not configured. Please set IMAGINEPRO_API_KEY environment variable."
                    .to_string(),
            )
        })
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// A zero limit would reject every prompt, so it is refused at load time.
fn parse_max_prompt_length(raw: &str) -> Result<usize, CoreError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CoreError::Configuration(format!(
            "MAX_PROMPT_LENGTH must be a positive integer, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_remote_contract() {
        let config = GenerationConfig::default();
        assert_eq!(config.base_url, "https://api.imaginepro.ai/api/v1");
        assert_eq!(config.max_prompt_length, 1000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.remote_timeout_hint_secs, 900);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn require_api_key_fails_when_missing() {
        let config = GenerationConfig::default();
        assert!(matches!(
            config.require_api_key(),
            Err(CoreError::Configuration(_))
        ));
    }

    #[test]
    fn require_api_key_returns_credential() {
        let config = GenerationConfig {
            api_key: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "secret");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = GenerationConfig {
            base_url: "http://127.0.0.1:9000/api/v1".into(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint("/nova/imagine"),
            "http://127.0.0.1:9000/api/v1/nova/imagine"
        );
        assert_eq!(
            config.endpoint("message/fetch/abc"),
            "http://127.0.0.1:9000/api/v1/message/fetch/abc"
        );
    }

    #[test]
    fn max_prompt_length_must_be_positive() {
        assert_eq!(parse_max_prompt_length(" 250 ").unwrap(), 250);
        assert!(matches!(
            parse_max_prompt_length("0"),
            Err(CoreError::Configuration(_))
        ));
        assert!(parse_max_prompt_length("-5").is_err());
        assert!(parse_max_prompt_length("lots").is_err());
    }
}
