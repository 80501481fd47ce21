//! Train/holdout splitting of a weekly series

use crate::data::{Observation, Series};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Default number of holdout weeks
pub const DEFAULT_HORIZON: usize = 52;

/// A series cut into a training prefix and a holdout suffix
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    train: Series,
    holdout: Series,
    boundary: Observation,
}

/// Split `series` so the final `horizon` weeks form the holdout
///
/// The split is a plain suffix cut: order and contiguity are preserved and
/// the training part is never empty.
pub fn split_holdout(series: &Series, horizon: usize) -> Result<Split> {
    if horizon >= series.len() {
        return Err(ForecastError::InsufficientData {
            needed: horizon,
            available: series.len(),
        });
    }

    let cut = series.len() - horizon;
    let train = series.slice(0, cut);
    let holdout = series.slice(cut, series.len());
    let boundary = train.get(cut - 1).ok_or(ForecastError::InsufficientData {
        needed: horizon,
        available: series.len(),
    })?;

    Ok(Split {
        train,
        holdout,
        boundary,
    })
}

impl Split {
    /// Training prefix
    pub fn train(&self) -> &Series {
        &self.train
    }

    /// Holdout suffix
    pub fn holdout(&self) -> &Series {
        &self.holdout
    }

    /// Number of holdout weeks
    pub fn horizon(&self) -> usize {
        self.holdout.len()
    }

    /// Last training observation, where the forecast starts
    pub fn boundary(&self) -> Observation {
        self.boundary
    }

    pub fn boundary_date(&self) -> NaiveDate {
        self.boundary.date
    }

    pub fn boundary_value(&self) -> f64 {
        self.boundary.value
    }

    /// Join train and holdout back into one series
    pub fn rejoin(&self) -> Result<Series> {
        self.train.concat(&self.holdout)
    }
}
