//! # Series Math
//!
//! Numeric building blocks for autoregressive time series models.
//! This crate provides lag polynomial arithmetic, differencing, the
//! parameter transforms that keep fitted models stationary and invertible,
//! and the slice statistics the models need.

use thiserror::Error;

pub mod polynomial;
pub mod statistics;
pub mod transforms;

pub use polynomial::{difference, LagPolynomial};
pub use transforms::{constrain_invertible, constrain_stationary, psi_weights};

/// Errors that can occur in series calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
