//! Configuration loading from YAML or TOML files

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kpub_ads::AdsConfig;
use kpub_match::AffiliationConfig;
use kpub_match::counts::DEFAULT_FIELDS;
use serde::Deserialize;

/// Files tried in the working directory, in order.
const LOCAL_CONFIGS: &[&str] = &["kpub.yaml", "config.live.yaml", "kpub.toml"];

/// Global configuration for kpub
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Facility name used in report titles
    pub prepend: String,
    pub missions: Vec<String>,
    pub sciences: Vec<String>,
    /// Instrument names (patterns) offered during review and counted by `words`
    pub instruments: Vec<String>,
    /// Patterns whose mention marks a paper as archive use
    pub archive: Vec<String>,
    /// Word (pattern) to highlight color
    pub colors: BTreeMap<String, String>,
    /// Acknowledgement search terms; every hit is reviewed
    pub ads_query_terms_group_1: Vec<String>,
    /// Title/abstract search terms; hits are pre-filtered
    pub ads_query_terms_group_2: Vec<String>,
    pub ads: AdsConfig,
    pub http: HttpSettings,
    pub affiliations: AffiliationConfig,
    /// Article fields searched for instrument and archive words
    pub text_fields: Vec<String>,
    /// First year shown in charts
    pub year_begin: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prepend: String::new(),
            missions: Vec::new(),
            sciences: Vec::new(),
            instruments: Vec::new(),
            archive: Vec::new(),
            colors: BTreeMap::new(),
            ads_query_terms_group_1: Vec::new(),
            ads_query_terms_group_2: Vec::new(),
            ads: AdsConfig::default(),
            http: HttpSettings::default(),
            affiliations: AffiliationConfig::default(),
            text_fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            year_begin: 2009,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds
    pub timeout: u64,
    pub max_retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: 60,
            max_retries: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./kpub.yaml, ./config.live.yaml, ./kpub.toml
    /// 2. ~/.config/kpub/config.yaml (or config.toml)
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        for name in LOCAL_CONFIGS {
            let local = PathBuf::from(name);
            if local.exists() {
                return Self::from_file(&local);
            }
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "kpub") {
            for name in ["config.yaml", "config.toml"] {
                let user_config = dirs.config_dir().join(name);
                if user_config.exists() {
                    return Self::from_file(&user_config);
                }
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file; `.toml` files are TOML,
    /// anything else YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content, Format::of(path))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(content: &str, format: Format) -> Result<Self> {
        Ok(match format {
            Format::Toml => toml::from_str(content)?,
            // an empty YAML document is null
            Format::Yaml if content.trim().is_empty() => Self::default(),
            Format::Yaml => serde_yaml::from_str(content)?,
        })
    }

    /// Report title prefix, e.g. "Keck".
    pub fn facility(&self) -> String {
        kpub_report::capitalize(&self.prepend)
    }
}
