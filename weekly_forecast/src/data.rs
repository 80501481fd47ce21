//! Observations, weekly series, and CSV loading

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use polars::prelude::{CsvReader, DataFrame, DataType, SerReader, Series as PolarsSeries};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// One measurement of one entity on one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Weekly series for a single entity
///
/// Dates are strictly increasing and exactly seven days apart, and every
/// value is finite. A `Series` never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    entity: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl Series {
    /// Create a series, validating weekly spacing and finite values
    pub fn new(entity: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        if let Some(pair) = dates.windows(2).find(|w| w[1] - w[0] != Duration::weeks(1)) {
            return Err(ForecastError::ValidationError(format!(
                "Dates {} and {} are not one week apart",
                pair[0], pair[1]
            )));
        }

        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::ValidationError(format!(
                "Value for {} is not finite",
                dates[position]
            )));
        }

        Ok(Self {
            entity: entity.into(),
            dates,
            values,
        })
    }

    /// Create a series of consecutive weeks starting at `start`
    pub fn weekly(entity: impl Into<String>, start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = (0..values.len())
            .map(|i| start + Duration::weeks(i as i64))
            .collect();
        Self::new(entity, dates, values)
    }

    /// Entity the series belongs to
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Week labels
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Weekly values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Value at a position as an observation
    pub fn get(&self, index: usize) -> Option<Observation> {
        Some(Observation::new(*self.dates.get(index)?, *self.values.get(index)?))
    }

    /// All points as observations
    pub fn observations(&self) -> Vec<Observation> {
        self.dates
            .iter()
            .zip(self.values.iter())
            .map(|(&date, &value)| Observation::new(date, value))
            .collect()
    }

    /// Contiguous part of the series, `start..end`
    pub(crate) fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            entity: self.entity.clone(),
            dates: self.dates[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        }
    }

    /// Append another series that continues this one week by week
    pub fn concat(&self, other: &Self) -> Result<Self> {
        if self.entity != other.entity {
            return Err(ForecastError::ValidationError(format!(
                "Cannot join series of '{}' and '{}'",
                self.entity, other.entity
            )));
        }

        let mut dates = self.dates.clone();
        dates.extend_from_slice(&other.dates);
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);

        Self::new(self.entity.clone(), dates, values)
    }
}

/// Column names and entity selection for the loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Column holding the entity name
    pub entity_column: String,
    /// Column holding the observation date
    pub date_column: String,
    /// Column holding the measured value
    pub value_column: String,
    /// Entity to select
    pub entity: String,
    /// chrono format of the date column
    pub date_format: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            entity_column: "Entity".to_string(),
            date_column: "Day".to_string(),
            value_column: "Weekly cases per million people".to_string(),
            entity: "United States".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Data loader for raw observations
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load the selected entity's observations from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Vec<Observation>> {
        let path = path.as_ref();
        info!(path = %path.display(), entity = %config.entity, "loading observations");

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df, config)
    }

    /// Extract the selected entity's observations from a DataFrame
    ///
    /// Rows with a null value are skipped. The result is sorted by date and
    /// may contain several observations for the same date.
    pub fn from_dataframe(df: &DataFrame, config: &LoaderConfig) -> Result<Vec<Observation>> {
        let entities = Self::column(df, &config.entity_column, &DataType::Utf8)?;
        let dates = Self::column(df, &config.date_column, &DataType::Utf8)?;
        let values = Self::column(df, &config.value_column, &DataType::Float64)?;

        let mut observations = Vec::new();
        for ((entity, date), value) in entities
            .utf8()?
            .into_iter()
            .zip(dates.utf8()?.into_iter())
            .zip(values.f64()?.into_iter())
        {
            if entity.map(str::trim) != Some(config.entity.as_str()) {
                continue;
            }
            let Some(value) = value.filter(|v| v.is_finite()) else {
                continue;
            };
            let date = date.ok_or_else(|| {
                ForecastError::DataError(format!("Missing date for entity '{}'", config.entity))
            })?;
            let date = NaiveDate::parse_from_str(date.trim(), &config.date_format).map_err(|e| {
                ForecastError::DataError(format!(
                    "Cannot parse date '{}' with format '{}': {}",
                    date, config.date_format, e
                ))
            })?;

            observations.push(Observation::new(date, value));
        }

        if observations.is_empty() {
            return Err(ForecastError::DataNotFound {
                entity: config.entity.clone(),
            });
        }

        observations.sort_by_key(|o| o.date);
        debug!(
            rows = observations.len(),
            entity = %config.entity,
            "selected observations"
        );

        Ok(observations)
    }

    fn column(df: &DataFrame, name: &str, dtype: &DataType) -> Result<PolarsSeries> {
        let column = df.column(name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", name, e))
        })?;

        column.cast(dtype).map_err(|e| {
            ForecastError::DataError(format!(
                "Column '{}' cannot be converted to {}: {}",
                name, dtype, e
            ))
        })
    }
}
