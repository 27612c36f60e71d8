use novagen_core::config::GenerationConfig;
use novagen_core::error::CoreError;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local use. The remote-service
/// and archive settings live in the embedded [`GenerationConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Whole-request timeout in seconds (default: `120`). A status request
    /// may download several images at 30 s each, so keep this generous.
    pub request_timeout_secs: u64,
    /// Remote API credential, endpoints and archive root.
    pub generation: GenerationConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    ///
    /// See [`GenerationConfig::from_env`] for the remaining variables.
    pub fn from_env() -> Result<Self, CoreError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = parse_var("PORT", "5000")?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_var("REQUEST_TIMEOUT_SECS", "120")?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            generation: GenerationConfig::from_env()?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T, CoreError> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.into());
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Configuration(format!("{name} must be a valid number, got '{raw}'")))
}
