//! OpenAI client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{LlmError, Result};

/// Configuration for the OpenAI client.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    /// Initial API key for authentication.
    pub api_key: String,
    /// Optional organization ID, sent as `OpenAI-Organization`.
    pub organization: Option<String>,
    /// Request timeout in seconds, enforced by the transport.
    pub timeout_secs: Option<u64>,
    /// Fail with [`Error::UnsupportedEnvironment`](crate::Error::UnsupportedEnvironment)
    /// instead of returning an empty result when the environment is unknown.
    pub strict_environment: bool,
}

impl OpenAIConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `OPENAI_API_KEY` - Required API key
    /// - `OPENAI_ORGANIZATION` - Optional organization ID
    /// - `OPENAI_TIMEOUT_SECS` - Optional timeout; ignored when not a number
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::auth("openai", "OPENAI_API_KEY environment variable not set"))?;

        let mut config = Self::new(api_key);
        config.organization = std::env::var("OPENAI_ORGANIZATION").ok();
        if let Some(secs) = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            config.timeout_secs = Some(secs);
        }

        Ok(config)
    }

    /// Sets the organization ID.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Disables the request timeout.
    #[must_use]
    pub const fn without_timeout(mut self) -> Self {
        self.timeout_secs = None;
        self
    }

    /// Turns unknown-environment fallthrough into an error.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict_environment = strict;
        self
    }

    /// The timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            organization: None,
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
            strict_environment: false,
        }
    }
}

impl fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &(!self.api_key.is_empty()).then_some("<redacted>"))
            .field("organization", &self.organization)
            .field("timeout_secs", &self.timeout_secs)
            .field("strict_environment", &self.strict_environment)
            .finish()
    }
}
