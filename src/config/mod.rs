use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::LineCatalog;

pub const DEFAULT_RADIUS_M: u32 = 500;
pub const DEFAULT_OUTPUT: &str = "mrt_export_data.csv";

fn default_ids() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub radius: Option<u32>,
    #[serde(default = "default_ids")]
    pub ids: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub overpass: Option<OverpassConfig>,
    /// Line name -> station names; replaces the built-in catalog when set
    #[serde(default)]
    pub lines: Option<BTreeMap<String, Vec<String>>>,
}

impl FileConfig {
    /// Search the default locations and return the first config that parses
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly requested config file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    pub fn catalog(&self) -> LineCatalog {
        match &self.lines {
            Some(lines) if !lines.is_empty() => LineCatalog::new(lines.clone()),
            _ => LineCatalog::builtin(),
        }
    }
}

fn default_overpass_urls() -> Vec<String> {
    vec![
        "https://overpass-api.de/api/interpreter".to_string(),
        "https://overpass.kumi.systems/api/interpreter".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_retry_delay_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverpassConfig {
    #[serde(default = "default_overpass_urls")]
    pub urls: Vec<String>,
    /// Server-side query timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause after a failed endpoint before trying the next one
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl OverpassConfig {
    /// HTTP client timeout, slightly above the server-side limit
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs + 20)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            urls: default_overpass_urls(),
            timeout_secs: default_timeout_secs(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("mrt-amenities.toml"));
    paths.push(PathBuf::from(".mrt-amenities.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mrt-amenities").join("config.toml"));
        paths.push(config_dir.join("mrt-amenities.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".mrt-amenities.toml"));
    }

    paths
}
