//! Weekly resampling of raw observations
//!
//! Observations are grouped into calendar weeks that end on an anchor
//! weekday (Sunday by default) and averaged. Each week is labelled with its
//! final day.

use crate::data::{Observation, Series};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What to do with weeks that have no observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Reject the series with `ResamplingGap`
    #[default]
    Fail,
    /// Fill empty weeks by linear interpolation between populated neighbours
    Interpolate,
}

/// Last day of the week containing `date`, for weeks ending on `anchor`
pub fn week_ending(date: NaiveDate, anchor: Weekday) -> NaiveDate {
    let today = date.weekday().num_days_from_monday() as i64;
    let end = anchor.num_days_from_monday() as i64;
    date + Duration::days((end - today).rem_euclid(7))
}

/// Weekly means before gap handling
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyBins {
    entity: String,
    weeks: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl WeeklyBins {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Every week label from the first to the last populated week
    pub fn weeks(&self) -> &[NaiveDate] {
        &self.weeks
    }

    /// Weekly means, `None` for weeks without observations
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Labels of the weeks without observations
    pub fn gaps(&self) -> Vec<NaiveDate> {
        self.weeks
            .iter()
            .zip(self.values.iter())
            .filter(|(_, value)| value.is_none())
            .map(|(week, _)| *week)
            .collect()
    }

    /// Turn the bins into a gap-free series
    pub fn into_series(self, policy: GapPolicy) -> Result<Series> {
        let gaps = self.gaps();
        if gaps.is_empty() {
            let values = self.values.into_iter().flatten().collect();
            return Series::new(self.entity, self.weeks, values);
        }

        match policy {
            GapPolicy::Fail => Err(ForecastError::ResamplingGap {
                entity: self.entity,
                week: gaps[0],
            }),
            GapPolicy::Interpolate => {
                warn!(
                    entity = %self.entity,
                    weeks = gaps.len(),
                    first = %gaps[0],
                    "interpolating empty weeks"
                );
                let values = interpolate(&self.values)?;
                Series::new(self.entity, self.weeks, values)
            }
        }
    }
}

/// Group observations into weeks ending on `anchor` and average each week
pub fn resample_weekly(
    entity: &str,
    observations: &[Observation],
    anchor: Weekday,
) -> Result<WeeklyBins> {
    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for observation in observations {
        let bucket = buckets
            .entry(week_ending(observation.date, anchor))
            .or_insert((0.0, 0));
        bucket.0 += observation.value;
        bucket.1 += 1;
    }

    let (first, last) = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(ForecastError::DataNotFound {
                entity: entity.to_string(),
            })
        }
    };

    let mut weeks = Vec::new();
    let mut values = Vec::new();
    let mut week = first;
    while week <= last {
        weeks.push(week);
        values.push(buckets.get(&week).map(|(sum, count)| sum / *count as f64));
        week += Duration::weeks(1);
    }

    debug!(
        entity,
        observations = observations.len(),
        weeks = weeks.len(),
        "resampled to weekly means"
    );

    Ok(WeeklyBins {
        entity: entity.to_string(),
        weeks,
        values,
    })
}

/// Linear interpolation of interior gaps
fn interpolate(values: &[Option<f64>]) -> Result<Vec<f64>> {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    let mut result = Vec::with_capacity(values.len());
    let mut segment = 0;
    for (i, value) in values.iter().enumerate() {
        if let Some(value) = value {
            result.push(*value);
            continue;
        }

        while segment + 1 < known.len() && known[segment + 1].0 < i {
            segment += 1;
        }
        let bounds = known
            .get(segment)
            .zip(known.get(segment + 1))
            .filter(|((left, _), (right, _))| *left < i && i < *right);
        let Some((&(left, left_value), &(right, right_value))) = bounds else {
            return Err(ForecastError::DataError(
                "Cannot interpolate a gap at the edge of the series".to_string(),
            ));
        };

        let step = (right_value - left_value) * (i - left) as f64 / (right - left) as f64;
        result.push(left_value + step);
    }

    Ok(result)
}
