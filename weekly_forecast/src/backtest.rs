//! Aligned backtest view of a forecast against its holdout
//!
//! The view only composes already validated pieces: the full series, the
//! forecast over the holdout span, and the train/holdout boundary. Every
//! date in it comes from the series.

use crate::data::{Observation, Series};
use crate::error::{ForecastError, Result};
use crate::metrics::{evaluate_forecast, BacktestAccuracy};
use crate::models::{ConfidenceBound, ForecastResult};
use crate::split::Split;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One holdout week with its forecast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub forecast: f64,
    pub band: ConfidenceBound,
    pub actual: f64,
}

/// Full series, holdout forecast and boundary on one time axis
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestView {
    entity: String,
    history: Vec<Observation>,
    rows: Vec<ForecastRow>,
    boundary: Observation,
    significance_level: f64,
}

/// CSV record of the exported view
#[derive(Debug, Serialize)]
struct ExportRecord {
    date: NaiveDate,
    segment: &'static str,
    actual: f64,
    forecast: Option<f64>,
    lower: Option<f64>,
    upper: Option<f64>,
    forecast_start: bool,
}

impl BacktestView {
    /// Align a forecast with the series it was made from
    pub fn build(series: &Series, split: &Split, forecast: &ForecastResult) -> Result<Self> {
        let cut = split.train().len();
        if cut + split.horizon() != series.len()
            || series.dates()[..cut] != *split.train().dates()
            || series.dates()[cut..] != *split.holdout().dates()
        {
            return Err(ForecastError::ValidationError(
                "Split does not partition the series".to_string(),
            ));
        }

        if forecast.dates() != split.holdout().dates() {
            return Err(ForecastError::ValidationError(format!(
                "Forecast covers {} weeks but the holdout has {} weeks starting {:?}",
                forecast.horizons(),
                split.horizon(),
                split.holdout().first_date()
            )));
        }

        let rows = split
            .holdout()
            .observations()
            .into_iter()
            .zip(forecast.values().iter())
            .zip(forecast.intervals().iter())
            .map(|((actual, &point), &band)| ForecastRow {
                date: actual.date,
                forecast: point,
                band,
                actual: actual.value,
            })
            .collect();

        Ok(Self {
            entity: series.entity().to_string(),
            history: series.observations(),
            rows,
            boundary: split.boundary(),
            significance_level: forecast.significance_level(),
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The full series
    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    /// Forecast rows over the holdout span
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    /// Last training observation, where the forecast starts
    pub fn boundary(&self) -> Observation {
        self.boundary
    }

    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// Holdout accuracy of the forecast
    pub fn accuracy(&self) -> Result<BacktestAccuracy> {
        let forecast: Vec<f64> = self.rows.iter().map(|r| r.forecast).collect();
        let actual: Vec<f64> = self.rows.iter().map(|r| r.actual).collect();
        let band: Vec<ConfidenceBound> = self.rows.iter().map(|r| r.band).collect();
        evaluate_forecast(&forecast, &actual, &band)
    }

    /// Write the view as CSV, one row per week of the series
    ///
    /// The file is written next to `path` under a temporary name and moved
    /// into place once complete.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let partial = partial_path(path);

        if let Err(err) = self.write_records(&partial) {
            let _ = fs::remove_file(&partial);
            return Err(err);
        }
        fs::rename(&partial, path)?;

        info!(path = %path.display(), rows = self.history.len(), "wrote backtest view");
        Ok(())
    }

    fn write_records(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        let holdout_start = self.history.len() - self.rows.len();

        for (i, observation) in self.history.iter().enumerate() {
            let row = i.checked_sub(holdout_start).map(|j| &self.rows[j]);
            writer.serialize(ExportRecord {
                date: observation.date,
                segment: if row.is_some() { "holdout" } else { "train" },
                actual: observation.value,
                forecast: row.map(|r| r.forecast),
                lower: row.map(|r| r.band.lower),
                upper: row.map(|r| r.band.upper),
                forecast_start: observation.date == self.boundary.date,
            })?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "backtest.csv".to_string());
    path.with_file_name(format!(".{}.partial", name))
}
