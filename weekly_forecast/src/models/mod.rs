//! Forecasting models for weekly series

use crate::data::Series;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Default significance level of the confidence band
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Two-sided confidence bound for one forecast step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBound {
    pub lower: f64,
    pub upper: f64,
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Week labels of the forecast steps
    dates: Vec<NaiveDate>,
    /// Forecasted values
    values: Vec<f64>,
    /// Confidence band, one bound per step
    intervals: Vec<ConfidenceBound>,
    /// Significance level of the band
    significance_level: f64,
}

impl ForecastResult {
    /// Create a new forecast result
    ///
    /// Every step needs a date, a value and a bound with
    /// `lower <= value <= upper`.
    pub fn new(
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
        intervals: Vec<ConfidenceBound>,
        significance_level: f64,
    ) -> Result<Self> {
        if values.len() != dates.len() || values.len() != intervals.len() {
            return Err(ForecastError::ValidationError(format!(
                "Forecast lengths differ: {} dates, {} values, {} intervals",
                dates.len(),
                values.len(),
                intervals.len()
            )));
        }

        for ((date, value), bound) in dates.iter().zip(values.iter()).zip(intervals.iter()) {
            if !(bound.lower <= *value && *value <= bound.upper) {
                return Err(ForecastError::ValidationError(format!(
                    "Forecast {} for {} is outside its band [{}, {}]",
                    value, date, bound.lower, bound.upper
                )));
            }
        }

        Ok(Self {
            dates,
            values,
            intervals,
            significance_level,
        })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the week labels of the forecast
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    /// Get the confidence band
    pub fn intervals(&self) -> &[ConfidenceBound] {
        &self.intervals
    }

    /// Significance level `α` of the band; coverage is `1 - α`
    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }
}

/// Non-seasonal order `(p, d, q)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// Moving-average order
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

/// Seasonal order `(P, D, Q, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal autoregressive order
    pub p: usize,
    /// Seasonal differencing order
    pub d: usize,
    /// Seasonal moving-average order
    pub q: usize,
    /// Season length in weeks
    pub period: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }
}

/// Nelder-Mead settings for the likelihood search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Iteration limit; reaching it is a fit failure
    pub max_iter: u64,
    /// Standard deviation of the simplex costs at which the search stops
    pub tolerance: f64,
    /// Offset of the initial simplex vertices from the zero start
    pub initial_step: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iter: 50_000,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

/// Model family, orders, band level and optimizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub order: ArimaOrder,
    pub seasonal: Option<SeasonalOrder>,
    pub significance_level: f64,
    pub optimizer: OptimizerConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::arima_preset()
    }
}

impl ModelConfig {
    /// ARIMA(5,1,5) with a 95% band
    pub fn arima_preset() -> Self {
        Self {
            order: ArimaOrder::new(5, 1, 5),
            seasonal: None,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            optimizer: OptimizerConfig::default(),
        }
    }

    /// SARIMA(5,1,5)(1,0,1,26) with a 95% band
    pub fn sarima_preset() -> Self {
        Self {
            seasonal: Some(SeasonalOrder::new(1, 0, 1, 26)),
            ..Self::arima_preset()
        }
    }

    /// Check the settings that do not depend on the data
    pub fn validate(&self) -> Result<()> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Significance level must be between 0 and 1, got {}",
                self.significance_level
            )));
        }

        let optimizer = &self.optimizer;
        if optimizer.max_iter == 0
            || !(optimizer.tolerance > 0.0)
            || !(optimizer.initial_step > 0.0)
        {
            return Err(ForecastError::InvalidParameter(format!(
                "Optimizer needs a positive iteration limit, tolerance and step, got {:?}",
                optimizer
            )));
        }

        if let Some(seasonal) = &self.seasonal {
            if seasonal.period < 2 {
                return Err(ForecastError::ModelFitError(format!(
                    "Seasonal period must be at least 2, got {}",
                    seasonal.period
                )));
            }
        }

        Ok(())
    }

    /// Display name such as `ARIMA(5,1,5)` or `SARIMA(5,1,5)(1,0,1,26)`
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ArimaOrder { p, d, q } = self.order;
        match &self.seasonal {
            Some(s) => write!(
                f,
                "SARIMA({},{},{})({},{},{},{})",
                p, d, q, s.p, s.d, s.q, s.period
            ),
            None => write!(f, "ARIMA({},{},{})", p, d, q),
        }
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for the weeks following the training data
    fn forecast(&self, horizons: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a weekly series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a weekly series
    fn train(&self, data: &Series) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
