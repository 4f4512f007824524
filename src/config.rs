//! Configuration file support.
//!
//! Every setting has a default, so the tool runs without a config file. A
//! TOML file only needs the keys it wants to override:
//!
//! ```toml
//! [data]
//! residents_path = "vault_residents.csv"
//!
//! [demographics]
//! annual_birth_rate = 0.06
//!
//! [demographics.mortality]
//! senior = 0.07
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub paging: PagingSettings,
    #[serde(default)]
    pub projection: ProjectionSettings,
    #[serde(default)]
    pub demographics: DemographicsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_residents_path")]
    pub residents_path: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingSettings {
    /// Records requested per page when scanning the whole population.
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: usize,
    /// Rows shown per screen in the resident listing.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSettings {
    #[serde(default = "default_projection_years")]
    pub years: u32,
}

/// Annual mortality coefficient per age band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortalityRates {
    pub infant: f64,
    pub child: f64,
    pub adolescent: f64,
    pub young_adult: f64,
    pub adult: f64,
    pub middle_aged: f64,
    pub senior: f64,
}

impl Default for MortalityRates {
    fn default() -> Self {
        Self {
            infant: 0.01,
            child: 0.001,
            adolescent: 0.001,
            young_adult: 0.002,
            adult: 0.003,
            middle_aged: 0.01,
            senior: 0.05,
        }
    }
}

/// Domain constants used by the projection and viability heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicsConfig {
    /// Share of the female population assumed to be of childbearing age.
    pub childbearing_fraction: f64,
    /// Annual births per woman of childbearing age.
    pub annual_birth_rate: f64,
    pub mortality: MortalityRates,
    /// Above this active population at least one death per year is assumed.
    pub min_mortality_population: usize,
    /// Below this population births shrink proportionally.
    pub breeding_pool_threshold: i64,
    pub minimum_viable_population: i64,
    /// Growth rate (percent) under which family incentives are advised.
    pub low_growth_threshold: f64,
    /// Population under which genetic diversity monitoring is advised.
    pub genetic_monitoring_threshold: i64,
    /// Acceptable male ratio, inclusive.
    pub sex_ratio_min: f64,
    pub sex_ratio_max: f64,
}

impl Default for DemographicsConfig {
    fn default() -> Self {
        Self {
            childbearing_fraction: 0.4,
            annual_birth_rate: 0.08,
            mortality: MortalityRates::default(),
            min_mortality_population: 50,
            breeding_pool_threshold: 100,
            minimum_viable_population: 160,
            low_growth_threshold: 0.5,
            genetic_monitoring_threshold: 300,
            sex_ratio_min: 0.4,
            sex_ratio_max: 0.6,
        }
    }
}

fn default_residents_path() -> PathBuf {
    PathBuf::from("vault_residents.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_scan_page_size() -> usize {
    100
}

fn default_list_page_size() -> usize {
    15
}

fn default_projection_years() -> u32 {
    10
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            residents_path: default_residents_path(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            scan_page_size: default_scan_page_size(),
            list_page_size: default_list_page_size(),
        }
    }
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            years: default_projection_years(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `path` when given, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}
