//! Seasonal ARIMA models for weekly forecasting
//!
//! `SARIMA(p,d,q)(P,D,Q,s)` with plain ARIMA as the `seasonal: None` case.
//!
//! Fitting minimises the conditional sum of squares of the one-step
//! innovations over the differenced training series, which is the
//! conditional Gaussian maximum-likelihood estimate. The search runs over
//! unconstrained values that map onto stationary AR and invertible MA
//! polynomials, so every candidate is a valid model. Forecasts and their
//! variance come from the fully expanded polynomials
//! `φ(B)Φ(B^s)(1-B)^d(1-B^s)^D y = θ(B)Θ(B^s) e`.

use crate::data::Series;
use crate::error::{ForecastError, Result};
use crate::models::{
    ArimaOrder, ConfidenceBound, ForecastModel, ForecastResult, ModelConfig, SeasonalOrder,
    TrainedForecastModel,
};
use argmin::core::{CostFunction, Error as ArgminError, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use chrono::{Duration, NaiveDate};
use series_math::statistics::{self, sum_of_squares};
use series_math::{constrain_invertible, constrain_stationary, psi_weights, LagPolynomial};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::debug;

/// Cost of parameters whose polynomials cannot be built
const LARGE_COST: f64 = 1e30;

/// SARIMA model (Seasonal AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct SarimaModel {
    /// Name of the model
    name: String,
    /// Orders, band level and optimizer settings
    config: ModelConfig,
}

/// Fitted coefficients, in the usual sign conventions
#[derive(Debug, Clone, PartialEq)]
pub struct SarimaCoefficients {
    /// `φ` of `1 - φ1 B - ...`
    pub ar: Vec<f64>,
    /// `θ` of `1 + θ1 B + ...`
    pub ma: Vec<f64>,
    /// `Φ` of `1 - Φ1 B^s - ...`
    pub seasonal_ar: Vec<f64>,
    /// `Θ` of `1 + Θ1 B^s + ...`
    pub seasonal_ma: Vec<f64>,
}

/// Trained SARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarimaModel {
    /// Name of the model
    name: String,
    /// Settings the model was trained with
    config: ModelConfig,
    /// Fitted coefficients
    coefficients: SarimaCoefficients,
    /// Mean removed before fitting, zero when the model differences
    mean: f64,
    /// Innovation variance
    sigma2: f64,
    /// `φ(B)Φ(B^s)` times the differencing operators
    integrated_ar: LagPolynomial,
    /// `θ(B)Θ(B^s)`
    full_ma: LagPolynomial,
    /// Demeaned training values
    history: Vec<f64>,
    /// Innovations aligned with `history`, zero where not estimated
    innovations: Vec<f64>,
    /// Number of innovations entering the likelihood
    effective_observations: usize,
    /// Optimizer iterations
    iterations: usize,
    /// Last training week
    last_date: NaiveDate,
}

/// Parameter layout of the unconstrained search vector
#[derive(Debug, Clone, Copy)]
struct Layout {
    order: ArimaOrder,
    seasonal: SeasonalOrder,
}

impl Layout {
    fn new(config: &ModelConfig) -> Self {
        Self {
            order: config.order,
            seasonal: config.seasonal.unwrap_or(SeasonalOrder::new(0, 0, 0, 1)),
        }
    }

    fn parameter_count(&self) -> usize {
        self.order.p + self.order.q + self.seasonal.p + self.seasonal.q
    }

    fn differencing(&self) -> Result<LagPolynomial> {
        let regular = LagPolynomial::difference(1, self.order.d)?;
        let seasonal = LagPolynomial::difference(self.seasonal.period, self.seasonal.d)?;
        Ok(regular.multiply(&seasonal))
    }

    fn is_differenced(&self) -> bool {
        self.order.d + self.seasonal.d > 0
    }

    fn coefficients(&self, params: &[f64]) -> SarimaCoefficients {
        let (ar, rest) = params.split_at(self.order.p);
        let (ma, rest) = rest.split_at(self.order.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(self.seasonal.p);

        SarimaCoefficients {
            ar: constrain_stationary(ar),
            ma: constrain_invertible(ma),
            seasonal_ar: constrain_stationary(seasonal_ar),
            seasonal_ma: constrain_invertible(seasonal_ma),
        }
    }

    /// `(φ(B)Φ(B^s), θ(B)Θ(B^s))`
    fn polynomials(&self, coefficients: &SarimaCoefficients) -> Result<(LagPolynomial, LagPolynomial)> {
        let period = self.seasonal.period;
        let ar = LagPolynomial::autoregressive(&coefficients.ar, 1)?
            .multiply(&LagPolynomial::autoregressive(&coefficients.seasonal_ar, period)?);
        let ma = LagPolynomial::moving_average(&coefficients.ma, 1)?
            .multiply(&LagPolynomial::moving_average(&coefficients.seasonal_ma, period)?);
        Ok((ar, ma))
    }
}

impl SarimaModel {
    /// Create a model from a full configuration
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: config.name(),
            config,
        })
    }

    /// Create a non-seasonal ARIMA(p,d,q) model
    pub fn arima(p: usize, d: usize, q: usize) -> Result<Self> {
        Self::new(ModelConfig {
            order: ArimaOrder::new(p, d, q),
            seasonal: None,
            ..ModelConfig::default()
        })
    }

    /// Create a SARIMA(p,d,q)(P,D,Q,s) model
    pub fn sarima(order: ArimaOrder, seasonal: SeasonalOrder) -> Result<Self> {
        Self::new(ModelConfig {
            order,
            seasonal: Some(seasonal),
            ..ModelConfig::default()
        })
    }

    /// Use a different significance level for the confidence band
    pub fn with_significance_level(self, significance_level: f64) -> Result<Self> {
        Self::new(ModelConfig {
            significance_level,
            ..self.config
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

/// One-step innovations of `ar(B) w = ma(B) e`, conditional on zero
/// innovations before the first `ar.degree()` values
fn innovations(w: &[f64], ar: &LagPolynomial, ma: &LagPolynomial) -> Vec<f64> {
    let start = ar.degree();
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut value = w[t];
        for i in 1..=ar.degree() {
            value += ar.coefficient(i) * w[t - i];
        }
        for j in 1..=ma.degree().min(t) {
            value -= ma.coefficient(j) * e[t - j];
        }
        e[t] = value;
    }
    e
}

/// Conditional sum of squares over the differenced training series
///
/// The cost is the mean square innovation divided by the mean square of
/// `w`, so the stopping tolerance does not depend on the scale of the data.
#[derive(Debug, Clone)]
struct CssProblem {
    layout: Layout,
    w: Vec<f64>,
    ar_degree: usize,
    effective_observations: usize,
    scale: f64,
}

impl CssProblem {
    fn new(layout: Layout, w: Vec<f64>) -> Self {
        let ar_degree = layout.order.p + layout.seasonal.p * layout.seasonal.period;
        let effective_observations = w.len().saturating_sub(ar_degree);
        let scale = sum_of_squares(&w) / w.len().max(1) as f64;
        Self {
            layout,
            w,
            ar_degree,
            effective_observations,
            scale: if scale > 0.0 && scale.is_finite() { scale } else { 1.0 },
        }
    }

    /// Innovations and their mean square at `params`
    fn evaluate(&self, params: &[f64]) -> Result<(Vec<f64>, f64)> {
        let coefficients = self.layout.coefficients(params);
        let (ar, ma) = self.layout.polynomials(&coefficients)?;
        let e = innovations(&self.w, &ar, &ma);
        let mean_square =
            sum_of_squares(&e[self.ar_degree..]) / self.effective_observations as f64;
        Ok((e, mean_square))
    }
}

impl CostFunction for CssProblem {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        let cost = self
            .evaluate(param)
            .map(|(_, mean_square)| mean_square / self.scale)
            .unwrap_or(LARGE_COST);
        Ok(if cost.is_finite() { cost } else { LARGE_COST })
    }
}

impl SarimaModel {
    /// Minimise the CSS cost from the zero start, returning the best
    /// parameters and the iteration count
    fn minimize(&self, problem: CssProblem, k: usize) -> Result<(Vec<f64>, usize)> {
        let optimizer = &self.config.optimizer;
        let fit_error =
            |e: ArgminError| ForecastError::ModelFitError(format!("{}: {}", self.name, e));

        let mut simplex = vec![vec![0.0; k]];
        for i in 0..k {
            let mut vertex = vec![0.0; k];
            vertex[i] = optimizer.initial_step;
            simplex.push(vertex);
        }

        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(optimizer.tolerance)
            .map_err(fit_error)?;
        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(optimizer.max_iter))
            .run()
            .map_err(fit_error)?;

        let iterations = result.state.get_iter() as usize;
        match result.state.get_termination_reason() {
            Some(TerminationReason::SolverConverged) => {}
            Some(TerminationReason::MaxItersReached) => {
                return Err(ForecastError::ModelFitError(format!(
                    "{} did not converge after {} iterations",
                    self.name, iterations
                )))
            }
            other => {
                return Err(ForecastError::ModelFitError(format!(
                    "{} stopped without converging: {:?}",
                    self.name, other
                )))
            }
        }

        let params = result
            .state
            .get_best_param()
            .ok_or_else(|| {
                ForecastError::ModelFitError(format!("{} returned no parameters", self.name))
            })?
            .clone();
        Ok((params, iterations))
    }
}

impl ForecastModel for SarimaModel {
    type Trained = TrainedSarimaModel;

    fn train(&self, data: &Series) -> Result<TrainedSarimaModel> {
        let layout = Layout::new(&self.config);
        let ArimaOrder { p, d, q } = layout.order;
        let n = data.len();

        if p + d + q >= n {
            return Err(ForecastError::ModelFitError(format!(
                "{} needs more than {} observations, have {}",
                self.name,
                p + d + q,
                n
            )));
        }

        let differencing = layout.differencing()?;
        if differencing.degree() >= n {
            return Err(ForecastError::ModelFitError(format!(
                "{} differences away all {} observations",
                self.name, n
            )));
        }

        let mean = if layout.is_differenced() {
            0.0
        } else {
            statistics::mean(data.values())?
        };
        let history: Vec<f64> = data.values().iter().map(|v| v - mean).collect();
        let w = differencing.apply(&history)?;

        let k = layout.parameter_count();
        let problem = CssProblem::new(layout, w);
        let effective_observations = problem.effective_observations;
        if effective_observations <= k {
            return Err(ForecastError::ModelFitError(format!(
                "{} has {} parameters but only {} usable observations",
                self.name, k, effective_observations
            )));
        }

        let (params, iterations) = if k == 0 {
            (Vec::new(), 0)
        } else {
            self.minimize(problem.clone(), k)?
        };

        let (e, sigma2) = problem.evaluate(&params)?;
        if !sigma2.is_finite() {
            return Err(ForecastError::ModelFitError(format!(
                "{} produced a non-finite innovation variance",
                self.name
            )));
        }
        let coefficients = layout.coefficients(&params);
        let (ar, ma) = layout.polynomials(&coefficients)?;

        let mut aligned = vec![0.0; differencing.degree()];
        aligned.extend_from_slice(&e);

        let last_date = data.last_date().ok_or(ForecastError::InsufficientData {
            needed: 1,
            available: 0,
        })?;

        debug!(
            model = %self.name,
            iterations,
            sigma2,
            ar = ?coefficients.ar,
            ma = ?coefficients.ma,
            "fitted model"
        );

        Ok(TrainedSarimaModel {
            name: self.name.clone(),
            config: self.config.clone(),
            coefficients,
            mean,
            sigma2,
            integrated_ar: ar.multiply(&differencing),
            full_ma: ma,
            history,
            innovations: aligned,
            effective_observations,
            iterations,
            last_date,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSarimaModel {
    /// Forecast with a band at the given significance level
    pub fn forecast_with_significance(
        &self,
        horizon: usize,
        significance_level: f64,
    ) -> Result<ForecastResult> {
        if !(significance_level > 0.0 && significance_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "Significance level must be between 0 and 1, got {}",
                significance_level
            )));
        }

        let ar = &self.integrated_ar;
        let ma = &self.full_ma;
        let n = self.history.len();

        let mut z = self.history.clone();
        let mut e = self.innovations.clone();
        for _ in 0..horizon {
            let t = z.len();
            let mut value = 0.0;
            for i in 1..=ar.degree().min(t) {
                value -= ar.coefficient(i) * z[t - i];
            }
            for j in 1..=ma.degree().min(t) {
                value += ma.coefficient(j) * e[t - j];
            }
            z.push(value);
            e.push(0.0);
        }

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ModelFitError(format!("Normal distribution: {}", e)))?;
        let z_score = normal.inverse_cdf(1.0 - significance_level / 2.0);

        let psi = psi_weights(ar, ma, horizon);
        let mut cumulative = 0.0;
        let mut values = Vec::with_capacity(horizon);
        let mut intervals = Vec::with_capacity(horizon);
        let mut dates = Vec::with_capacity(horizon);
        for (step, weight) in psi.iter().enumerate() {
            cumulative += weight * weight;
            let point = z[n + step] + self.mean;
            let half_width = z_score * (self.sigma2 * cumulative).sqrt();
            values.push(point);
            intervals.push(ConfidenceBound {
                lower: point - half_width,
                upper: point + half_width,
            });
            dates.push(self.last_date + Duration::weeks(step as i64 + 1));
        }

        ForecastResult::new(dates, values, intervals, significance_level)
    }

    /// Fitted coefficients
    pub fn coefficients(&self) -> &SarimaCoefficients {
        &self.coefficients
    }

    /// Settings the model was trained with
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Mean removed before fitting (zero for differenced models)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Innovation variance `σ²`
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Estimated innovations of the training series
    pub fn residuals(&self) -> &[f64] {
        &self.innovations
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Last training week
    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    /// Conditional Gaussian log-likelihood at the fitted parameters
    ///
    /// Infinite when the training series is fitted exactly.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.effective_observations as f64;
        -0.5 * n * ((2.0 * PI * self.sigma2).ln() + 1.0)
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        let layout = Layout::new(&self.config);
        let mut parameters = layout.parameter_count() + 1;
        if !layout.is_differenced() {
            parameters += 1;
        }
        -2.0 * self.log_likelihood() + 2.0 * parameters as f64
    }
}

impl TrainedForecastModel for TrainedSarimaModel {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        self.forecast_with_significance(horizons, self.config.significance_level)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
