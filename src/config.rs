use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::feature::{Feature, ModelNames};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub bind_addr: String,
    pub gemini_base_url: String,
    pub models: ModelNames,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let Some(api_key) = get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY")) else {
            bail!("GOOGLE_API_KEY environment variable is not set");
        };

        let request_timeout = match get("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("GEMINI_TIMEOUT_SECS: invalid value {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            models: ModelNames {
                face_swap: get("GEMINI_FACE_SWAP_MODEL")
                    .unwrap_or_else(|| Feature::FaceSwap.default_model().to_string()),
                prompt_generation: get("GEMINI_PROMPT_MODEL")
                    .unwrap_or_else(|| Feature::PromptGeneration.default_model().to_string()),
            },
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}
