//! Runtime configuration
//!
//! Read from the process environment (a `.env` file is loaded first by the
//! binary). Every setting has a default so the assistant runs offline.

use crate::classifier::zero_shot::DEFAULT_ENDPOINT;
use crate::classifier::{IntentClassifier, KeywordClassifier, ZeroShotClient};
use crate::error::AssistantError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOLDINGS_PATH: &str = "data/holdings.csv";
pub const DEFAULT_TRADES_PATH: &str = "data/trades.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which ranking source answers the classify call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    Keyword,
    ZeroShot,
}

impl FromStr for ClassifierBackend {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "keywords" | "offline" => Ok(ClassifierBackend::Keyword),
            "zero-shot" | "zero_shot" | "zeroshot" | "remote" => Ok(ClassifierBackend::ZeroShot),
            other => Err(AssistantError::ConfigError(format!(
                "Unknown classifier backend '{}' (expected keyword or zero-shot)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub holdings_path: PathBuf,
    pub trades_path: PathBuf,
    pub classifier: ClassifierBackend,
    pub zero_shot_endpoint: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            holdings_path: PathBuf::from(DEFAULT_HOLDINGS_PATH),
            trades_path: PathBuf::from(DEFAULT_TRADES_PATH),
            classifier: ClassifierBackend::Keyword,
            zero_shot_endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get("FUND_QA_HOLDINGS_PATH") {
            config.holdings_path = PathBuf::from(path);
        }
        if let Some(path) = get("FUND_QA_TRADES_PATH") {
            config.trades_path = PathBuf::from(path);
        }
        if let Some(backend) = get("FUND_QA_CLASSIFIER") {
            config.classifier = backend.parse()?;
        }
        if let Some(endpoint) = get("ZERO_SHOT_ENDPOINT") {
            config.zero_shot_endpoint = endpoint;
        }
        config.api_token = get("HF_API_TOKEN");
        if let Some(secs) = get("ZERO_SHOT_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                AssistantError::ConfigError(format!(
                    "ZERO_SHOT_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    secs
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Construct the configured classifier
    pub fn build_classifier(&self) -> Result<Box<dyn IntentClassifier>> {
        match self.classifier {
            ClassifierBackend::Keyword => Ok(Box::new(KeywordClassifier)),
            ClassifierBackend::ZeroShot => Ok(Box::new(ZeroShotClient::new(
                self.zero_shot_endpoint.clone(),
                self.api_token.clone(),
                self.timeout,
            )?)),
        }
    }
}
