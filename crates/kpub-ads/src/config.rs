//! ADS client settings and API token lookup

use std::path::{Path, PathBuf};

use kpub_core::ApiError;
use serde::Deserialize;

/// ADS caps a single page at 2000 rows.
pub const MAX_ROWS_PER_PAGE: u32 = 2000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdsConfig {
    pub base_url: String,
    /// API token; `${VAR}` references are expanded at load time
    #[serde(deserialize_with = "deserialize_env_var")]
    pub token: Option<String>,
    pub rows_per_page: u32,
    /// Upper bound on results read for one query
    pub max_results: usize,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.adsabs.harvard.edu/v1".to_string(),
            token: None,
            rows_per_page: MAX_ROWS_PER_PAGE,
            max_results: 100_000,
        }
    }
}

/// Deserialize a string that may contain an environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to the environment variable value
pub fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

/// Token file used by the ADS python client.
fn dev_key_file() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".ads").join("dev_key"))
}

fn read_token_file(path: &Path) -> Option<String> {
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Find the API token: config, `ADS_DEV_KEY`, `ADS_API_TOKEN`, then `~/.ads/dev_key`.
pub fn resolve_token(config: &AdsConfig) -> Result<String, ApiError> {
    let from_config = config.token.clone().filter(|t| !t.trim().is_empty());
    from_config
        .or_else(|| std::env::var("ADS_DEV_KEY").ok())
        .or_else(|| std::env::var("ADS_API_TOKEN").ok())
        .or_else(|| dev_key_file().and_then(|p| read_token_file(&p)))
        .ok_or_else(|| {
            ApiError::Auth(
                "this action requires an ADS API token (set ADS_DEV_KEY or ads.token)".into(),
            )
        })
}
