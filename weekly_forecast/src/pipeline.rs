//! Single forward pass from raw observations to a backtest view
//!
//! Each stage runs once and the first failure ends the run. Errors leave
//! this module as `ForecastError::PipelineError` naming the stage and
//! entity.

use crate::backtest::BacktestView;
use crate::config::PipelineConfig;
use crate::data::{DataLoader, Series};
use crate::error::Result;
use crate::metrics::BacktestAccuracy;
use crate::models::arima::SarimaModel;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::resample::resample_weekly;
use crate::split::split_holdout;
use std::path::Path;
use tracing::info;

/// Outcome of a backtest run
#[derive(Debug, Clone)]
pub struct BacktestReport {
    /// Display name of the fitted model
    pub model_name: String,
    /// Series, forecast and boundary on one time axis
    pub view: BacktestView,
    /// Holdout accuracy
    pub accuracy: BacktestAccuracy,
    /// Fitted innovation variance
    pub sigma2: f64,
    /// Optimizer iterations
    pub iterations: usize,
    /// Akaike information criterion of the fit
    pub aic: f64,
}

/// Load and resample the configured entity's weekly series
pub fn load_series<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<Series> {
    let entity = config.loader.entity.as_str();

    let observations =
        DataLoader::from_csv(path, &config.loader).map_err(|e| e.in_stage("load", entity))?;

    let series = resample_weekly(entity, &observations, config.anchor)
        .and_then(|bins| bins.into_series(config.gap_policy))
        .map_err(|e| e.in_stage("resample", entity))?;

    info!(
        entity,
        weeks = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "loaded weekly series"
    );
    Ok(series)
}

/// Fit on all but the last `horizon` weeks and forecast the holdout
pub fn run_backtest(series: &Series, config: &PipelineConfig) -> Result<BacktestReport> {
    let entity = series.entity();
    config.validate().map_err(|e| e.in_stage("configure", entity))?;

    let split = split_holdout(series, config.horizon).map_err(|e| e.in_stage("split", entity))?;
    info!(
        entity,
        train = split.train().len(),
        holdout = split.horizon(),
        boundary = %split.boundary().date,
        "split series"
    );

    let model = SarimaModel::new(config.model.clone()).map_err(|e| e.in_stage("fit", entity))?;
    let trained = model
        .train(split.train())
        .map_err(|e| e.in_stage("fit", entity))?;
    info!(
        model = trained.name(),
        sigma2 = trained.sigma2(),
        iterations = trained.iterations(),
        "fitted model"
    );

    let forecast = trained
        .forecast(split.horizon())
        .map_err(|e| e.in_stage("forecast", entity))?;

    let view = BacktestView::build(series, &split, &forecast)
        .map_err(|e| e.in_stage("backtest", entity))?;
    let accuracy = view
        .accuracy()
        .map_err(|e| e.in_stage("backtest", entity))?;
    info!(
        entity,
        mae = accuracy.mae,
        rmse = accuracy.rmse,
        coverage = accuracy.coverage,
        "evaluated holdout"
    );

    Ok(BacktestReport {
        model_name: trained.name().to_string(),
        view,
        accuracy,
        sigma2: trained.sigma2(),
        iterations: trained.iterations(),
        aic: trained.aic(),
    })
}

/// Load a CSV file and run the backtest on the configured entity
pub fn run_backtest_from_csv<P: AsRef<Path>>(
    path: P,
    config: &PipelineConfig,
) -> Result<BacktestReport> {
    config
        .validate()
        .map_err(|e| e.in_stage("configure", &config.loader.entity))?;
    let series = load_series(path, config)?;
    run_backtest(&series, config)
}
