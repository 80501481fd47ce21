//! Lag polynomial arithmetic
//!
//! A lag polynomial is stored by its coefficients in increasing powers of the
//! backshift operator `B`, so `1 - 0.5B` is `[1.0, -0.5]`. The
//! autoregressive and moving-average constructors follow the usual sign
//! conventions:
//! - AR: `1 - φ1 B^s - φ2 B^2s - ...`
//! - MA: `1 + θ1 B^s + θ2 B^2s + ...`

use crate::{MathError, Result};

/// Polynomial in the backshift operator
#[derive(Debug, Clone, PartialEq)]
pub struct LagPolynomial {
    coefficients: Vec<f64>,
}

impl LagPolynomial {
    /// The identity polynomial `1`
    pub fn one() -> Self {
        Self {
            coefficients: vec![1.0],
        }
    }

    /// Autoregressive polynomial `1 - Σ phi[i] B^((i+1)*lag)`
    pub fn autoregressive(phi: &[f64], lag: usize) -> Result<Self> {
        Self::sparse(phi, lag, -1.0)
    }

    /// Moving-average polynomial `1 + Σ theta[i] B^((i+1)*lag)`
    pub fn moving_average(theta: &[f64], lag: usize) -> Result<Self> {
        Self::sparse(theta, lag, 1.0)
    }

    /// Differencing operator `(1 - B^lag)^order`
    pub fn difference(lag: usize, order: usize) -> Result<Self> {
        let step = Self::autoregressive(&[1.0], lag)?;
        let mut result = Self::one();
        for _ in 0..order {
            result = result.multiply(&step);
        }
        Ok(result)
    }

    fn sparse(params: &[f64], lag: usize, sign: f64) -> Result<Self> {
        if lag == 0 {
            return Err(MathError::InvalidInput(
                "Lag must be greater than zero".to_string(),
            ));
        }

        let mut coefficients = vec![0.0; params.len() * lag + 1];
        coefficients[0] = 1.0;
        for (i, &param) in params.iter().enumerate() {
            coefficients[(i + 1) * lag] = sign * param;
        }

        Ok(Self { coefficients })
    }

    /// Product of two polynomials
    pub fn multiply(&self, other: &Self) -> Self {
        let mut coefficients = vec![0.0; self.coefficients.len() + other.coefficients.len() - 1];
        for (i, &a) in self.coefficients.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (j, &b) in other.coefficients.iter().enumerate() {
                coefficients[i + j] += a * b;
            }
        }

        Self { coefficients }
    }

    /// Highest power of `B`
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// All coefficients, constant term first
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of `B^power`, zero beyond the degree
    pub fn coefficient(&self, power: usize) -> f64 {
        self.coefficients.get(power).copied().unwrap_or(0.0)
    }

    /// Apply the polynomial to a series, producing one value per index from
    /// `degree()` onwards
    pub fn apply(&self, series: &[f64]) -> Result<Vec<f64>> {
        let degree = self.degree();
        if series.len() <= degree {
            return Err(MathError::InsufficientData(format!(
                "Need more than {} observations, have {}",
                degree,
                series.len()
            )));
        }

        Ok((degree..series.len())
            .map(|t| {
                self.coefficients
                    .iter()
                    .enumerate()
                    .map(|(i, c)| c * series[t - i])
                    .sum()
            })
            .collect())
    }
}

/// Apply `(1 - B^lag)^order` to a series
pub fn difference(series: &[f64], lag: usize, order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(series.to_vec());
    }
    LagPolynomial::difference(lag, order)?.apply(series)
}
