//! Configuration options for the InnovaTube client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Backend origin used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5064";

/// Fixed prefix in front of every backend route.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// YouTube Data API v3 search endpoint.
pub const DEFAULT_YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Result cap sent with every catalog search.
pub const SEARCH_MAX_RESULTS: u32 = 12;

/// File name of the persisted session record.
pub const SESSION_FILE_NAME: &str = "innovatube_session.json";

/// Configuration options for the InnovaTube client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://localhost:5064`
    pub api_base_url: String,

    /// Prefix joined between the origin and every relative path
    pub api_prefix: String,

    /// Credential for the external video catalog
    pub youtube_api_key: Option<String>,

    /// Catalog search endpoint
    pub youtube_search_url: String,

    /// Site key for the bot-verification widget; when set, forms require a captcha token
    pub recaptcha_site_key: Option<String>,

    /// Where the session record is persisted; `None` keeps it in memory
    pub session_path: Option<PathBuf>,

    /// The request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            youtube_api_key: None,
            youtube_search_url: DEFAULT_YOUTUBE_SEARCH_URL.to_string(),
            recaptcha_site_key: None,
            session_path: None,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    /// Build a configuration from environment variables.
    ///
    /// Unset variables keep their defaults, except the session file which
    /// falls back to the per-user data directory.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = non_empty_var("INNOVATUBE_API_BASE_URL") {
            config = config.with_api_base_url(&url);
        }
        if let Some(key) = non_empty_var("YOUTUBE_API_KEY") {
            config = config.with_youtube_api_key(&key);
        }
        if let Some(url) = non_empty_var("YOUTUBE_SEARCH_URL") {
            config = config.with_youtube_search_url(&url);
        }
        if let Some(key) = non_empty_var("RECAPTCHA_SITE_KEY") {
            config = config.with_recaptcha_site_key(&key);
        }
        if let Some(secs) = non_empty_var("INNOVATUBE_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::config(format!("INNOVATUBE_TIMEOUT_SECS must be a number, got {secs:?}"))
            })?;
            config = config.with_request_timeout(Some(Duration::from_secs(secs)));
        }

        let session_path = match non_empty_var("INNOVATUBE_SESSION_FILE") {
            Some(path) => Some(PathBuf::from(path)),
            None => default_session_path(),
        };
        config.session_path = session_path;

        config.validate()?;
        Ok(config)
    }

    /// Check that the backend origin is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::config(format!(
                "api_base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        Url::parse(&self.youtube_search_url)?;
        Ok(())
    }

    /// Set the backend origin; a trailing `/` is dropped
    pub fn with_api_base_url(mut self, value: &str) -> Self {
        self.api_base_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the API prefix
    pub fn with_api_prefix(mut self, value: &str) -> Self {
        self.api_prefix = value.to_string();
        self
    }

    /// Set the catalog API key
    pub fn with_youtube_api_key(mut self, value: &str) -> Self {
        self.youtube_api_key = Some(value.to_string());
        self
    }

    /// Set the catalog search endpoint
    pub fn with_youtube_search_url(mut self, value: &str) -> Self {
        self.youtube_search_url = value.to_string();
        self
    }

    /// Set the bot-verification site key
    pub fn with_recaptcha_site_key(mut self, value: &str) -> Self {
        self.recaptcha_site_key = Some(value.to_string());
        self
    }

    /// Persist the session in this file
    pub fn with_session_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.session_path = Some(value.into());
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Whether login and registration need a captcha token
    pub fn requires_captcha(&self) -> bool {
        self.recaptcha_site_key
            .as_deref()
            .map_or(false, |key| !key.trim().is_empty())
    }
}

/// `<data dir>/innovatube/innovatube_session.json`
pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("innovatube").join(SESSION_FILE_NAME))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
