//! Generator configuration.
//!
//! A config file controls which producers run, how they are seeded, what
//! metadata they stamp and where the records go.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names searched for in the current directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["tracegen.yaml", ".tracegen.yaml"];

/// Top-level generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub version: String,
    /// Master seed. Unset means a different run every time.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of records to generate
    #[serde(default = "default_count")]
    pub count: usize,
    /// Simulated time of the first emission (default: now)
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Glob patterns of producer names to run (empty: all)
    #[serde(default)]
    pub producers: Vec<String>,
    /// Glob patterns of producer names to skip
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Records per sink write
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub meta: MetaConfig,
    #[serde(default)]
    pub sink: Option<SinkConfig>,
}

fn default_count() -> usize {
    100
}

fn default_batch_size() -> usize {
    50
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: String::new(),
            seed: None,
            count: default_count(),
            start: None,
            producers: Vec::new(),
            exclude: Vec::new(),
            batch_size: default_batch_size(),
            meta: MetaConfig::default(),
            sink: None,
        }
    }
}

impl GeneratorConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: GeneratorConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load an explicit config, a discovered one, or the defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(),
        };
        match path {
            Some(p) => Ok((Self::parse_file(&p)?, Some(p))),
            None => Ok((Self::default(), None)),
        }
    }
}

/// Discover a config file in the current directory.
pub fn discover() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Values for the default metadata provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetaConfig {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_true")]
    pub incoming: bool,
    #[serde(default = "default_destination")]
    pub destination: String,
    #[serde(default = "default_destination_port")]
    pub destination_port: u16,
    /// Add the emission time as `requestTime` (default: false)
    #[serde(default)]
    pub include_time: bool,
}

fn default_true() -> bool {
    true
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_destination() -> String {
    "76.47.25.189".to_string()
}

fn default_destination_port() -> u16 {
    443
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            incoming: true,
            destination: default_destination(),
            destination_port: default_destination_port(),
            include_time: false,
        }
    }
}

/// HTTP collector that receives generated records.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SinkConfig {
    pub url: String,
    /// Sent as the `Authorization` header
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_timeout() -> u64 {
    5000
}

/// Validate a config for correctness.
pub fn validate(config: &GeneratorConfig) -> anyhow::Result<()> {
    if config.count == 0 {
        anyhow::bail!("count must be greater than zero");
    }
    if config.batch_size == 0 {
        anyhow::bail!("batch_size must be greater than zero");
    }
    if config.meta.environment.trim().is_empty() {
        anyhow::bail!("meta.environment must not be empty");
    }

    for pattern in config.producers.iter().chain(&config.exclude) {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid producer pattern {:?}: {}", pattern, e))?;
    }

    if let Some(sink) = &config.sink {
        let url = reqwest::Url::parse(&sink.url)
            .map_err(|e| anyhow::anyhow!("invalid sink url {:?}: {}", sink.url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("sink url must be http or https, got {:?}", url.scheme());
        }
        if sink.timeout_ms == 0 {
            anyhow::bail!("sink.timeout_ms must be greater than zero");
        }
    }

    Ok(())
}
