use anyhow::{Context, Result, bail};
use chrono::Datelike;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::{fs, path::PathBuf};
use tracing::debug;

const DEFAULT_BLS_BASE_URL: &str = "https://api.bls.gov";
const DEFAULT_CACHE_FILE: &str = "dashboard_data.csv";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartColor {
    Blue,
    Green,
    Magenta,
    Yellow,
    Cyan,
    Red,
}

/// A named statistics series to fetch and chart.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SeriesDescriptor {
    pub name: String,
    pub id: String,
    pub units: Option<String>,
    pub color: Option<ChartColor>,
}

impl SeriesDescriptor {
    pub fn new(name: &str, id: &str) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            units: None,
            color: None,
        }
    }
}

/// Whether an existing cache file is trusted or always rewritten.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    #[default]
    PreferCache,
    AlwaysRefresh,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BlsProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub bls: Option<BlsProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            bls: Some(BlsProviderConfig {
                base_url: DEFAULT_BLS_BASE_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn bls_base_url(&self) -> &str {
        self.bls
            .as_ref()
            .map_or(DEFAULT_BLS_BASE_URL, |p| &p.base_url)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub series: Vec<SeriesDescriptor>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub cache_path: Option<String>,
    #[serde(default)]
    pub cache_mode: CacheMode,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("gov", "laborstats", "laborstats")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.cache_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.cache_dir().join(DEFAULT_CACHE_FILE))
    }

    /// Inclusive year range. Defaults to last year through the current year.
    pub fn year_range(&self) -> (i32, i32) {
        let current_year = chrono::Local::now().year();
        let end_year = self.end_year.unwrap_or(current_year);
        let start_year = self.start_year.unwrap_or(end_year - 1);
        (start_year, end_year)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            bail!("No series configured");
        }

        let mut names = HashSet::new();
        for series in &self.series {
            if series.id.trim().is_empty() {
                bail!("Series '{}' has an empty id", series.name);
            }
            if !names.insert(series.name.as_str()) {
                bail!("Duplicate series name: {}", series.name);
            }
        }

        let (start_year, end_year) = self.year_range();
        if start_year > end_year {
            bail!("start_year {start_year} is after end_year {end_year}");
        }
        Ok(())
    }
}
