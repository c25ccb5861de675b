//! Simple Kriging interpolation
//!
//! Linear estimator for a field whose mean m is known (by default the
//! sample mean of the observations). For K observations with residuals
//! rᵢ = zᵢ - m and a covariance model C:
//! ```text
//! Σ[i,j]  = C(xᵢ - xⱼ)                 K×K, factored once
//! Σ₀[i]   = C(xᵢ - x₀)                 per query point x₀
//! Σ·λ     = Σ₀
//! z*(x₀)  = m + Σᵢ λᵢ·rᵢ
//! σ²(x₀)  = C(0) - Σᵢ λᵢ·Σ₀[i]          clamped at 0
//! ```
//! Unlike ordinary kriging the weights carry no sum-to-one constraint.
//!
//! The estimator is exact: at an observed location λ is the unit vector of
//! that observation, so the estimate reproduces the value and the variance
//! vanishes.
//!
//! Reference:
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.
//! Goovaerts, P. (1997). Geostatistics for Natural Resources Evaluation.
//! Oxford University Press.

use crate::maybe_rayon::*;
use ndarray::Array2;
use geokrige_core::raster::{GridSpec, Raster};
use geokrige_core::vector::value_moments;
use geokrige_core::{Error, Observation, Result};

use super::cholesky::CholeskyFactor;
use super::covariance::CovarianceModel;

/// Clamped variances more negative than this fraction of C(0) are reported
const NEGATIVE_VARIANCE_WARN: f64 = 1e-6;

/// Mean assumed by the simple kriging estimator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum KrigingMean {
    /// Arithmetic mean of the observed values
    #[default]
    SampleMean,
    /// Externally known process mean
    Known(f64),
}

/// Parameters for Simple Kriging
#[derive(Debug, Clone)]
pub struct SimpleKrigingParams {
    /// Mean the residuals are taken from
    pub mean: KrigingMean,
    /// Reject covariance matrices whose condition estimate exceeds this.
    /// The estimate `(max Lᵢᵢ / min Lᵢᵢ)²` is a lower bound on κ₂(Σ) and
    /// can fall short of it by roughly a factor of K for large, nearly
    /// collinear sample sets, so treat the limit as a soft one.
    /// `None` accepts anything the factorization gets through, in which
    /// case results from ill-conditioned systems are best effort.
    pub max_condition_number: Option<f64>,
    /// Relative pivot tolerance of the Cholesky factorization
    pub pivot_tolerance: f64,
}

impl Default for SimpleKrigingParams {
    fn default() -> Self {
        Self {
            mean: KrigingMean::SampleMean,
            max_condition_number: Some(1e12),
            pivot_tolerance: 1e-12,
        }
    }
}

impl SimpleKrigingParams {
    fn validate(&self) -> Result<()> {
        if !(self.pivot_tolerance.is_finite() && self.pivot_tolerance >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "pivot_tolerance",
                value: self.pivot_tolerance.to_string(),
                reason: "must be finite and non-negative".into(),
            });
        }
        if let Some(limit) = self.max_condition_number
            && !(limit.is_finite() && limit >= 1.0)
        {
            return Err(Error::InvalidParameter {
                name: "max_condition_number",
                value: limit.to_string(),
                reason: "must be finite and at least 1".into(),
            });
        }
        if let KrigingMean::Known(m) = self.mean
            && !m.is_finite()
        {
            return Err(Error::InvalidInput(format!("known mean {} is not finite", m)));
        }
        Ok(())
    }
}

/// Estimates and variances for a list of query points, in query order
#[derive(Debug, Clone, Default)]
pub struct KrigingEstimate {
    pub estimates: Vec<f64>,
    pub variances: Vec<f64>,
}

impl KrigingEstimate {
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

/// Result of Simple Kriging over a grid
#[derive(Debug, Clone)]
pub struct KrigingResult {
    /// Interpolated values
    pub estimate: Raster<f64>,
    /// Kriging variance (estimation uncertainty)
    pub variance: Raster<f64>,
}

/// A simple kriging system fitted to a set of observations.
///
/// Fitting builds and factors the observation covariance matrix; every
/// subsequent estimate reuses that factor, so query points can be supplied
/// in as many batches as needed.
pub struct SimpleKriging<'a, C: CovarianceModel + ?Sized> {
    observations: Vec<Observation>,
    covariance: &'a C,
    factor: CholeskyFactor,
    residuals: Vec<f64>,
    mean: f64,
    sill: f64,
    condition: f64,
}

impl<'a, C: CovarianceModel + ?Sized> SimpleKriging<'a, C> {
    /// Validate the inputs and factor the observation covariance matrix.
    ///
    /// # Errors
    /// - [`Error::InvalidInput`] for an empty or non-finite observation set,
    ///   a non-finite known mean, or a covariance model returning NaN/∞
    /// - [`Error::SingularSystem`] for duplicate locations, a matrix that is
    ///   not positive definite, or one whose condition estimate exceeds
    ///   `params.max_condition_number`
    pub fn fit(
        observations: &[Observation],
        covariance: &'a C,
        params: &SimpleKrigingParams,
    ) -> Result<Self> {
        params.validate()?;

        let k = observations.len();
        if k == 0 {
            return Err(Error::InvalidInput(
                "simple kriging needs at least one observation".into(),
            ));
        }
        if let Some(i) = observations.iter().position(|o| !o.is_finite()) {
            let o = observations[i];
            return Err(Error::InvalidInput(format!(
                "observation {} is not finite: ({}, {}) = {}",
                i, o.x, o.y, o.value
            )));
        }
        check_distinct_locations(observations)?;

        let mean = match params.mean {
            KrigingMean::Known(m) => m,
            KrigingMean::SampleMean => value_moments(observations).map(|(m, _)| m).unwrap_or(0.0),
        };

        let sill = covariance.variance();
        if !sill.is_finite() {
            return Err(Error::InvalidInput(format!(
                "covariance model returned {} at zero lag",
                sill
            )));
        }

        // Σ[i,j] = C(xᵢ - xⱼ), evaluated once per unordered pair
        let mut sigma = Array2::<f64>::zeros((k, k));
        for i in 0..k {
            let (xi, yi) = observations[i].location();
            for j in 0..=i {
                let c = covariance.covariance(xi - observations[j].x, yi - observations[j].y);
                if !c.is_finite() {
                    return Err(Error::InvalidInput(format!(
                        "covariance model returned {} between observations {} and {}",
                        c, j, i
                    )));
                }
                sigma[(i, j)] = c;
                sigma[(j, i)] = c;
            }
        }

        let factor = CholeskyFactor::factorize(&sigma, params.pivot_tolerance)?;
        let condition = factor.condition_estimate();
        tracing::debug!(
            observations = k,
            mean,
            sill,
            condition,
            "fitted simple kriging system"
        );

        if let Some(limit) = params.max_condition_number
            && condition > limit
        {
            return Err(Error::SingularSystem {
                message: format!(
                    "covariance matrix is ill-conditioned (limit {:.3e}); check for \
                     near-duplicate locations or a range much longer than the sample spacing",
                    limit
                ),
                condition: Some(condition),
            });
        }

        let residuals = observations.iter().map(|o| o.value - mean).collect();

        Ok(Self {
            observations: observations.to_vec(),
            covariance,
            factor,
            residuals,
            mean,
            sill,
            condition,
        })
    }

    /// Mean the estimator works around
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Covariance at zero lag, the upper bound of every variance
    pub fn sill(&self) -> f64 {
        self.sill
    }

    /// Condition estimate of the observation covariance matrix
    pub fn condition_estimate(&self) -> f64 {
        self.condition
    }

    /// Number of observations in the system
    pub fn n_observations(&self) -> usize {
        self.observations.len()
    }

    /// Right-hand side Σ₀ for one query point
    fn target_covariances(&self, x: f64, y: f64) -> Result<Vec<f64>> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "query point ({}, {}) is not finite",
                x, y
            )));
        }
        self.observations
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let (dx, dy) = o.offset_from(x, y);
                let c = self.covariance.covariance(dx, dy);
                if c.is_finite() {
                    Ok(c)
                } else {
                    Err(Error::InvalidInput(format!(
                        "covariance model returned {} between observation {} and ({}, {})",
                        c, i, x, y
                    )))
                }
            })
            .collect()
    }

    /// Kriging weights λ for a query point
    pub fn weights(&self, x: f64, y: f64) -> Result<Vec<f64>> {
        let rhs = self.target_covariances(x, y)?;
        self.factor.solve(&rhs)
    }

    /// Estimate and variance at one point, plus the raw (unclamped) variance
    fn estimate_one(&self, x: f64, y: f64) -> Result<(f64, f64, f64)> {
        let rhs = self.target_covariances(x, y)?;
        let weights = self.factor.solve(&rhs)?;

        let mut estimate = self.mean;
        let mut explained = 0.0;
        for ((w, r), c0) in weights.iter().zip(&self.residuals).zip(&rhs) {
            estimate += w * r;
            explained += w * c0;
        }
        let raw_variance = self.sill - explained;

        Ok((estimate, raw_variance.max(0.0), raw_variance))
    }

    /// Estimate value and variance at a single point
    pub fn estimate_at(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let (estimate, variance, _) = self.estimate_one(x, y)?;
        Ok((estimate, variance))
    }

    /// Estimate values and variances at every query point.
    ///
    /// Results are in the order of `query_points`. Either every point gets
    /// a pair or the call fails as a whole.
    pub fn estimate(&self, query_points: &[(f64, f64)]) -> Result<KrigingEstimate> {
        let pairs: Vec<(f64, f64, f64)> = (0..query_points.len())
            .into_par_iter()
            .map(|m| {
                let (x, y) = query_points[m];
                self.estimate_one(x, y)
            })
            .collect::<Result<Vec<_>>>()?;

        let warn_below = -NEGATIVE_VARIANCE_WARN * self.sill.abs().max(f64::MIN_POSITIVE);
        let clamped = pairs.iter().filter(|(_, _, raw)| *raw < warn_below).count();
        if clamped > 0 {
            tracing::warn!(
                clamped,
                total = pairs.len(),
                "negative kriging variances clamped to zero; the covariance model may not be positive definite"
            );
        }

        let (estimates, variances): (Vec<f64>, Vec<f64>) = pairs.into_iter().map(|(e, v, _)| (e, v)).unzip();
        Ok(KrigingEstimate {
            estimates,
            variances,
        })
    }

    /// Estimate over every node of a grid
    pub fn estimate_grid(&self, grid: &GridSpec) -> Result<KrigingResult> {
        grid.validate()?;
        let nodes = grid.nodes();
        let KrigingEstimate {
            estimates,
            variances,
        } = self.estimate(&nodes)?;

        let mut estimate = Raster::from_vec(estimates, *grid)?;
        estimate.set_nodata(Some(f64::NAN));
        let mut variance = Raster::from_vec(variances, *grid)?;
        variance.set_nodata(Some(f64::NAN));

        Ok(KrigingResult { estimate, variance })
    }
}

/// Duplicate locations make two rows of Σ identical
fn check_distinct_locations(observations: &[Observation]) -> Result<()> {
    for (i, a) in observations.iter().enumerate() {
        for (j, b) in observations.iter().enumerate().skip(i + 1) {
            if a.x == b.x && a.y == b.y {
                return Err(Error::singular(format!(
                    "observations {} and {} share the location ({}, {})",
                    i, j, a.x, a.y
                )));
            }
        }
    }
    Ok(())
}

/// Fit a simple kriging system with default parameters and estimate at the
/// given points.
///
/// # Arguments
/// * `observations` - Sample points with (x, y, value), at least one
/// * `covariance` - Covariance model over lag vectors
/// * `query_points` - (x, y) locations to estimate at
///
/// # Returns
/// [`KrigingEstimate`] with one estimate and one variance per query point,
/// in query order.
pub fn fit_and_estimate<C: CovarianceModel + ?Sized>(
    observations: &[Observation],
    covariance: &C,
    query_points: &[(f64, f64)],
) -> Result<KrigingEstimate> {
    SimpleKriging::fit(observations, covariance, &SimpleKrigingParams::default())?
        .estimate(query_points)
}

/// Perform Simple Kriging from scattered points onto a grid.
///
/// # Returns
/// [`KrigingResult`] with estimate and variance rasters laid out on `grid`.
pub fn simple_kriging<C: CovarianceModel + ?Sized>(
    observations: &[Observation],
    covariance: &C,
    grid: &GridSpec,
    params: SimpleKrigingParams,
) -> Result<KrigingResult> {
    SimpleKriging::fit(observations, covariance, &params)?.estimate_grid(grid)
}
