//! Error types for the weekly_forecast crate

use chrono::NaiveDate;
use thiserror::Error;

/// Custom error types for the weekly_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The entity filter matched no rows with a value
    #[error("No data found for entity '{entity}'")]
    DataNotFound { entity: String },

    /// A week between the first and last observation has no data
    #[error("Week ending {week} has no observations for entity '{entity}'")]
    ResamplingGap { entity: String, week: NaiveDate },

    /// Series too short for the requested horizon
    #[error("Insufficient data: need more than {needed} observations, have {available}")]
    InsufficientData { needed: usize, available: usize },

    /// Model could not be fitted
    #[error("Model fit error: {0}")]
    ModelFitError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data parsing or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to inconsistent inputs
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV output
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from configuration parsing
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from numeric building blocks
    #[error("Math error: {0}")]
    MathError(#[from] series_math::MathError),

    /// A pipeline stage failed
    #[error("{stage} stage failed for '{entity}': {source}")]
    PipelineError {
        stage: &'static str,
        entity: String,
        #[source]
        source: Box<ForecastError>,
    },
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl ForecastError {
    /// Attach the failing pipeline stage and entity to an error
    pub fn in_stage(self, stage: &'static str, entity: &str) -> Self {
        ForecastError::PipelineError {
            stage,
            entity: entity.to_string(),
            source: Box::new(self),
        }
    }

    /// Stage that failed, if the error came from a pipeline run
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            ForecastError::PipelineError { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, skipping pipeline context
    pub fn root(&self) -> &ForecastError {
        match self {
            ForecastError::PipelineError { source, .. } => source.root(),
            other => other,
        }
    }
}
