//! # COVID Report
//!
//! `covid_report` ties the workspace crates together: `series_math` holds
//! the numeric building blocks and `weekly_forecast` the weekly
//! forecasting and backtesting pipeline.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use covid_report::weekly_forecast::{run_backtest, PipelineConfig, Series};
//! use covid_report::weekly_forecast::models::{ArimaOrder, ModelConfig};
//!
//! let start = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
//! let values: Vec<f64> = (0..60).map(|i| 100.0 + (i % 6) as f64).collect();
//! let series = Series::weekly("United States", start, values).unwrap();
//!
//! let config = PipelineConfig {
//!     horizon: 8,
//!     model: ModelConfig {
//!         order: ArimaOrder::new(1, 0, 0),
//!         ..ModelConfig::default()
//!     },
//!     ..PipelineConfig::default()
//! };
//!
//! let report = run_backtest(&series, &config).unwrap();
//! assert_eq!(report.view.rows().len(), 8);
//! ```

pub use series_math;
pub use weekly_forecast;

pub use weekly_forecast::{
    BacktestReport, BacktestView, ForecastError, PipelineConfig, Series, VERSION,
};

/// Model names for the two stock configurations
pub fn preset_names() -> [String; 2] {
    [
        PipelineConfig::arima().model.name(),
        PipelineConfig::sarima().model.name(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names() {
        assert_eq!(
            preset_names(),
            ["ARIMA(5,1,5)".to_string(), "SARIMA(5,1,5)(1,0,1,26)".to_string()]
        );
    }

    #[test]
    fn test_reexported_math() {
        let differenced = series_math::difference(&[1.0, 4.0, 9.0], 1, 1).unwrap();
        assert_eq!(differenced, vec![3.0, 5.0]);
    }
}
