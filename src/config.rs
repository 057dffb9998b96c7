//! Runtime configuration
//!
//! Read from the process environment (a `.env` file is loaded first by the
//! binary). Command-line flags override these values.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::ClassifierError;
use crate::model::{HuggingFaceModel, KeywordModel, ZeroShotModel};
use crate::Result;

pub const DEFAULT_MODEL_ID: &str = "facebook/bart-large-mnli";
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which zero-shot backend to classify with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    HuggingFace,
    Keyword,
}

impl FromStr for Backend {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Backend::HuggingFace),
            "keyword" | "offline" => Ok(Backend::Keyword),
            other => Err(ClassifierError::ConfigError(format!(
                "unknown model backend '{}' (expected 'huggingface' or 'keyword')",
                other
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Backend::HuggingFace => "huggingface",
            Backend::Keyword => "keyword",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub api_token: Option<String>,
    pub model_id: String,
    pub inference_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            api_token: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let backend = match get("INTENT_MODEL_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.backend,
        };

        let request_timeout_secs = match get("HF_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().map_err(|_| {
                ClassifierError::ConfigError(format!(
                    "HF_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    value
                ))
            })?,
            None => defaults.request_timeout_secs,
        };

        Ok(Self {
            backend,
            api_token: get("HF_API_TOKEN"),
            model_id: get("HF_MODEL_ID").unwrap_or(defaults.model_id),
            inference_url: get("HF_INFERENCE_URL").unwrap_or(defaults.inference_url),
            request_timeout_secs,
        })
    }

    /// Construct the configured zero-shot backend
    pub fn build_model(&self) -> Result<Box<dyn ZeroShotModel>> {
        match self.backend {
            Backend::HuggingFace => Ok(Box::new(HuggingFaceModel::new(self)?)),
            Backend::Keyword => Ok(Box::new(KeywordModel)),
        }
    }
}
