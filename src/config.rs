//! Runtime configuration.

use crate::error::{GenVidError, Result};
use crate::video::fetch::DEFAULT_FETCH_TIMEOUT;
use crate::video::gateway::{InferenceProvider, DEFAULT_HUB_URL, DEFAULT_ROUTER_URL};
use crate::video::persist::DEFAULT_OUTPUT_DIR;
use crate::video::DEFAULT_MODEL;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the Hugging Face token.
pub const TOKEN_ENV_VAR: &str = "HF_TOKEN";

/// Everything needed to generate and save videos.
///
/// The token lives here and is handed to the gateway; nothing else reads
/// the environment.
#[derive(Clone)]
pub struct Config {
    /// Bearer token for the inference router.
    pub token: String,
    /// Hub model identifier.
    pub model: String,
    /// Provider the router forwards to.
    pub provider: InferenceProvider,
    /// Directory receiving videos and metadata files.
    pub output_dir: PathBuf,
    /// Router base URL.
    pub router_url: String,
    /// Hub API base URL.
    pub hub_url: String,
    /// Interval between queue status checks.
    pub poll_interval: Duration,
    /// Maximum time to wait for a queued generation.
    pub timeout: Duration,
    /// Maximum time for downloading a returned video URL.
    pub fetch_timeout: Duration,
}

impl Config {
    /// Creates a configuration with defaults and the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            model: DEFAULT_MODEL.to_string(),
            provider: InferenceProvider::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            router_url: DEFAULT_ROUTER_URL.to_string(),
            hub_url: DEFAULT_HUB_URL.to_string(),
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(600),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Reads the token from `HF_TOKEN`.
    ///
    /// Load a `.env` file before calling this if one should be honored.
    pub fn from_env() -> Result<Self> {
        Self::from_token(std::env::var(TOKEN_ENV_VAR).ok())
    }

    fn from_token(token: Option<String>) -> Result<Self> {
        token
            .filter(|t| !t.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| {
                GenVidError::Config(format!(
                    "{TOKEN_ENV_VAR} not found in environment. Please set it in .env file."
                ))
            })
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the provider.
    pub fn with_provider(mut self, provider: InferenceProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the router base URL.
    pub fn with_router_url(mut self, url: impl Into<String>) -> Self {
        self.router_url = url.into();
        self
    }

    /// Sets the Hub API base URL.
    pub fn with_hub_url(mut self, url: impl Into<String>) -> Self {
        self.hub_url = url.into();
        self
    }

    /// Sets the queue polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the generation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the download timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// First characters of the token, for startup confirmation.
    pub fn token_hint(&self) -> String {
        let visible: String = self.token.chars().take(10).collect();
        format!("{visible}...")
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"***")
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("output_dir", &self.output_dir)
            .field("router_url", &self.router_url)
            .field("hub_url", &self.hub_url)
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}
