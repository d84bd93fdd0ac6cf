use std::env;
use std::time::Duration;

use validator::Validate;

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub view: ViewConfig,
}

/// Connection settings for the document workflow backend
#[derive(Debug, Clone, Validate)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing slash
    #[validate(url(message = "DOCFLOW_API_BASE must be a valid URL"))]
    pub base_url: String,
    /// User-Agent header sent with every request
    #[validate(length(min = 1, message = "DOCFLOW_USER_AGENT must not be empty"))]
    pub user_agent: String,
}

/// Screen behaviour settings
#[derive(Debug, Clone, Validate)]
pub struct ViewConfig {
    /// Workflow status poll period on the detail screen
    #[validate(range(
        min = 250,
        message = "DOCFLOW_POLL_INTERVAL_MS must be at least 250"
    ))]
    pub poll_interval_ms: u64,
}

impl Config {
    /// Read every section from the process environment; `.env` is loaded by `main`
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            api: ApiConfig::from_env()?,
            view: ViewConfig::from_env()?,
        })
    }

    /// Replace the backend base URL, e.g. from a command-line flag
    pub fn with_api_base(mut self, base_url: &str) -> Result<Self, String> {
        self.api = ApiConfig::new(base_url, &self.api.user_agent)?;
        Ok(self)
    }
}

impl ApiConfig {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";

    pub fn from_env() -> Result<Self, String> {
        let base_url =
            env::var("DOCFLOW_API_BASE").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string());

        let user_agent = env::var("DOCFLOW_USER_AGENT")
            .unwrap_or_else(|_| format!("docflow-console/{}", env!("CARGO_PKG_VERSION")));

        Self::new(&base_url, &user_agent)
    }

    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, String> {
        let config = Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

impl ViewConfig {
    const DEFAULT_POLL_INTERVAL_MS: u64 = 4000;

    pub fn from_env() -> Result<Self, String> {
        let poll_interval_ms = env::var("DOCFLOW_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| Self::DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "DOCFLOW_POLL_INTERVAL_MS must be a valid number".to_string())?;

        let config = Self { poll_interval_ms };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: Self::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
