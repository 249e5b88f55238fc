//! Pipeline configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! reproduces the stock run against the live NBU and MoF sources.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::bond::{DEFAULT_COUPON_FREQUENCY, DEFAULT_FACE_VALUE};

pub const DEFAULT_FAIR_VALUE_BASE_URL: &str = "https://bank.gov.ua/files/Fair_value";
pub const DEFAULT_COUPON_RATE_URL: &str =
    "https://mof.gov.ua/uk/local_bonds_issued_during_the_war_time-572";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_ISIN_PREFIX: &str = "UA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sources: SourceConfig,
    pub valuation: ValuationConfig,
    pub projection: ProjectionConfig,
}

impl PipelineConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.valuation.face_value > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "valuation.face_value must be positive, got {}",
                self.valuation.face_value
            )));
        }
        if self.valuation.coupon_frequency == 0 {
            return Err(ConfigError::Invalid(
                "valuation.coupon_frequency must be at least 1".into(),
            ));
        }
        if self.sources.max_lookback_days == Some(0) {
            return Err(ConfigError::Invalid(
                "sources.max_lookback_days must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}

/// Where and how to fetch the two provider tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Root of the NBU dated fair-value files (`{base}/{YYYYMM}/{YYYYMMDD}_fv.xlsx`).
    pub fair_value_base_url: String,
    /// MoF page embedding the war-bond coupon table.
    pub coupon_rate_url: String,
    pub user_agent: String,
    /// Stop walking back after this many days. `None` walks back without limit.
    pub max_lookback_days: Option<u32>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fair_value_base_url: DEFAULT_FAIR_VALUE_BASE_URL.into(),
            coupon_rate_url: DEFAULT_COUPON_RATE_URL.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            max_lookback_days: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    pub face_value: f64,
    pub coupon_frequency: u32,
    /// Only coupon-rate rows whose ISIN starts with this prefix are kept.
    pub isin_prefix: String,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            face_value: DEFAULT_FACE_VALUE,
            coupon_frequency: DEFAULT_COUPON_FREQUENCY,
            isin_prefix: DEFAULT_ISIN_PREFIX.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Principal projected for every bond.
    pub principal: f64,
    pub years: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            principal: 1_000.0,
            years: 2,
        }
    }
}
