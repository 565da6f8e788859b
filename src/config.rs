use crate::constants::{DEFAULT_DEPLOYMENT, MAX_TOKENS, REQUEST_TIMEOUT_SECS, TEMPERATURE};
use anyhow::{Result, anyhow};
use std::time::Duration;

pub const ENV_BASE: &str = "AZURE_OPENAI_BASE";
pub const ENV_VERSION: &str = "AZURE_OPENAI_VERSION";
pub const ENV_KEY: &str = "AZURE_OPENAI_KEY";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";

/// settings for the azure openai chat completion service
///
/// read once at startup; missing values only surface as errors when a
/// request is actually made
#[derive(Debug, Clone)]
pub struct Config {
    /// service base url, eg. `https://example.openai.azure.com`
    pub endpoint: Option<String>,

    /// `api-version` query parameter
    pub api_version: Option<String>,

    /// value of the `api-key` header
    pub api_key: Option<String>,

    /// deployment (engine) name, also sent as the model
    pub deployment: String,

    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// build a config from an arbitrary variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            endpoint: get(ENV_BASE),
            api_version: get(ENV_VERSION),
            api_key: get(ENV_KEY),
            deployment: get(ENV_DEPLOYMENT).unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    /// full chat completions url for the configured deployment
    pub fn completions_url(&self) -> Result<String> {
        let endpoint = require(self.endpoint.as_deref(), ENV_BASE)?;
        let api_version = require(self.api_version.as_deref(), ENV_VERSION)?;
        Ok(format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.trim_end_matches('/'),
            self.deployment,
            api_version
        ))
    }

    pub fn api_key(&self) -> Result<&str> {
        require(self.api_key.as_deref(), ENV_KEY)
    }
}

fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value.ok_or_else(|| anyhow!("{name} is not set"))
}
