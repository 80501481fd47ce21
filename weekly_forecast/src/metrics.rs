//! Metrics for evaluating a forecast against its holdout

use crate::error::{ForecastError, Result};
use crate::models::ConfidenceBound;
use serde::Serialize;

/// Holdout accuracy of a forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
    /// Share of actual values inside the confidence band, in percent
    pub coverage: f64,
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn evaluate_forecast(
    forecast: &[f64],
    actual: &[f64],
    band: &[ConfidenceBound],
) -> Result<BacktestAccuracy> {
    if forecast.len() != actual.len() || forecast.len() != band.len() || forecast.is_empty() {
        return Err(ForecastError::ValidationError(
            "Forecast, band and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let percentage_errors: Vec<f64> = actual
        .iter()
        .zip(errors.iter())
        .filter(|&(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .collect();
    let mape = if percentage_errors.is_empty() {
        0.0
    } else {
        percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64
    };

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let abs_a = a.abs();
            let abs_f = f.abs();
            if abs_a + abs_f == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / (abs_a + abs_f)
            }
        })
        .sum::<f64>()
        / n;

    let covered = actual
        .iter()
        .zip(band.iter())
        .filter(|&(&a, bound)| bound.lower <= a && a <= bound.upper)
        .count();
    let coverage = covered as f64 / n * 100.0;

    Ok(BacktestAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
        coverage,
    })
}

impl std::fmt::Display for BacktestAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Holdout Accuracy Metrics:")?;
        writeln!(f, "  MAE:      {:.4}", self.mae)?;
        writeln!(f, "  MSE:      {:.4}", self.mse)?;
        writeln!(f, "  RMSE:     {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:     {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE:    {:.4}%", self.smape)?;
        writeln!(f, "  Coverage: {:.2}%", self.coverage)?;
        Ok(())
    }
}
