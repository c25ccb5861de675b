//! Covariance models for kriging
//!
//! Under second-order stationarity the covariance and the semivariance of a
//! field with variance σ² are related by
//! ```text
//! C(h) = σ² - γ(h)
//! ```
//! [`SemivarianceCovariance`] applies this relation with σ² taken from the
//! observed values; any other symmetric kernel can be supplied through the
//! [`CovarianceModel`] trait, closures included.

use geokrige_core::vector::value_moments;
use geokrige_core::{Error, Observation, Result};

use super::variogram::SemivarianceModel;

/// Symmetric covariance kernel over 2D lag vectors.
///
/// Implementations must satisfy `covariance(dx, dy) == covariance(-dx, -dy)`
/// and should produce a positive-definite matrix over any set of distinct
/// locations. Positive-definiteness is not checked up front; a matrix that
/// violates it fails the Cholesky factorization.
pub trait CovarianceModel: Sync {
    /// Covariance for the lag `(dx, dy)`
    fn covariance(&self, dx: f64, dy: f64) -> f64;

    /// Covariance at zero lag: the process variance
    fn variance(&self) -> f64 {
        self.covariance(0.0, 0.0)
    }
}

impl<F> CovarianceModel for F
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    fn covariance(&self, dx: f64, dy: f64) -> f64 {
        self(dx, dy)
    }
}

/// Covariance derived from a semivariance model and a variance.
#[derive(Debug, Clone)]
pub struct SemivarianceCovariance<S> {
    semivariogram: S,
    variance: f64,
}

impl<S: SemivarianceModel> SemivarianceCovariance<S> {
    /// Use an explicit process variance
    pub fn new(semivariogram: S, variance: f64) -> Result<Self> {
        if !(variance.is_finite() && variance >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "variance",
                value: variance.to_string(),
                reason: "must be finite and non-negative".into(),
            });
        }
        Ok(Self {
            semivariogram,
            variance,
        })
    }

    /// Use the population variance of the observed values
    pub fn from_observations(semivariogram: S, observations: &[Observation]) -> Result<Self> {
        let (_, variance) = value_moments(observations)
            .ok_or_else(|| Error::InvalidInput("no observations to take a variance from".into()))?;
        if !variance.is_finite() {
            return Err(Error::InvalidInput(
                "observed values have a non-finite variance".into(),
            ));
        }
        Self::new(semivariogram, variance)
    }

    /// The underlying semivariance model
    pub fn semivariogram(&self) -> &S {
        &self.semivariogram
    }
}

impl<S: SemivarianceModel> CovarianceModel for SemivarianceCovariance<S> {
    fn covariance(&self, dx: f64, dy: f64) -> f64 {
        self.variance - self.semivariogram.semivariance(dx, dy)
    }

    fn variance(&self) -> f64 {
        self.variance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::Semivariogram;
    use approx::assert_relative_eq;

    #[test]
    fn test_covariance_from_sample_variance() {
        let obs = vec![
            Observation::new(0.0, 0.0, 1.0),
            Observation::new(1.0, 0.0, 3.0),
        ];
        let variogram = Semivariogram::spherical(0.0, 1.0, 10.0).unwrap();
        let cov = SemivarianceCovariance::from_observations(variogram, &obs).unwrap();

        assert_relative_eq!(cov.variance(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cov.covariance(0.0, 0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cov.covariance(10.0, 0.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(cov.covariance(2.0, 1.0), cov.covariance(-2.0, -1.0), epsilon = 1e-15);
    }

    #[test]
    fn test_closure_covariance() {
        let cov = |dx: f64, dy: f64| 4.0 * (-(dx * dx + dy * dy).sqrt() / 5.0).exp();
        assert_relative_eq!(cov.variance(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_observations_empty() {
        let variogram = Semivariogram::spherical(0.0, 1.0, 10.0).unwrap();
        let err = SemivarianceCovariance::from_observations(variogram, &[]).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(SemivarianceCovariance::new(variogram, -1.0).is_err());
    }
}
