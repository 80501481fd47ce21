//! # Weekly Forecast
//!
//! Weekly forecasting and holdout backtesting for COVID-19 case data.
//!
//! ## Features
//!
//! - Loading one entity's daily observations from a CSV file
//! - Weekly mean resampling with explicit gap handling
//! - Train/holdout suffix splits
//! - ARIMA and seasonal ARIMA models with confidence bands
//! - An aligned backtest view with accuracy metrics and CSV export
//!
//! ## Quick Start
//!
//! ```no_run
//! use weekly_forecast::{run_backtest_from_csv, PipelineConfig};
//!
//! let config = PipelineConfig::sarima();
//! let report = run_backtest_from_csv("covid.csv", &config)?;
//!
//! println!("{}", report.model_name);
//! println!("{}", report.accuracy);
//! report.view.write_csv("backtest.csv")?;
//! # Ok::<(), weekly_forecast::ForecastError>(())
//! ```
//!
//! The stages can also be run one at a time:
//!
//! ```
//! use chrono::NaiveDate;
//! use weekly_forecast::models::arima::SarimaModel;
//! use weekly_forecast::models::{ForecastModel, TrainedForecastModel};
//! use weekly_forecast::{split_holdout, BacktestView, Series};
//!
//! let start = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
//! let series = Series::weekly("United States", start, vec![100.0; 104])?;
//!
//! let split = split_holdout(&series, 52)?;
//! let trained = SarimaModel::arima(1, 0, 0)?.train(split.train())?;
//! let forecast = trained.forecast(split.horizon())?;
//!
//! let view = BacktestView::build(&series, &split, &forecast)?;
//! assert_eq!(view.rows().len(), 52);
//! # Ok::<(), weekly_forecast::ForecastError>(())
//! ```

pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod resample;
pub mod split;

// Re-export commonly used types
pub use crate::backtest::{BacktestView, ForecastRow};
pub use crate::config::PipelineConfig;
pub use crate::data::{DataLoader, LoaderConfig, Observation, Series};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::{evaluate_forecast, BacktestAccuracy};
pub use crate::models::{
    ForecastModel, ForecastResult, ModelConfig, OptimizerConfig, TrainedForecastModel,
};
pub use crate::pipeline::{load_series, run_backtest, run_backtest_from_csv, BacktestReport};
pub use crate::resample::{resample_weekly, GapPolicy, WeeklyBins};
pub use crate::split::{split_holdout, Split, DEFAULT_HORIZON};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
