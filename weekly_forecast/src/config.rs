//! Pipeline configuration

use crate::data::LoaderConfig;
use crate::error::{ForecastError, Result};
use crate::models::ModelConfig;
use crate::resample::GapPolicy;
use crate::split::DEFAULT_HORIZON;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings of a full backtest run
///
/// Every field has a default, so a JSON file only needs the values that
/// differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input columns and entity selection
    pub loader: LoaderConfig,
    /// Day each week ends on
    pub anchor: Weekday,
    /// Handling of weeks without observations
    pub gap_policy: GapPolicy,
    /// Number of holdout weeks
    pub horizon: usize,
    /// Model to fit
    pub model: ModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::arima()
    }
}

impl PipelineConfig {
    /// Backtest with ARIMA(5,1,5)
    pub fn arima() -> Self {
        Self {
            loader: LoaderConfig::default(),
            anchor: Weekday::Sun,
            gap_policy: GapPolicy::default(),
            horizon: DEFAULT_HORIZON,
            model: ModelConfig::arima_preset(),
        }
    }

    /// Backtest with SARIMA(5,1,5)(1,0,1,26)
    pub fn sarima() -> Self {
        Self {
            model: ModelConfig::sarima_preset(),
            ..Self::arima()
        }
    }

    /// Read and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be at least one week".to_string(),
            ));
        }
        if self.loader.entity.trim().is_empty() {
            return Err(ForecastError::ConfigError(
                "Entity must not be empty".to_string(),
            ));
        }
        self.model.validate()
    }
}
