//! Leave-one-out cross-validation of a covariance model
//!
//! Each observation is removed in turn, the system is refitted on the
//! remaining K-1 points and the withheld value is estimated. Good models
//! give a mean error near 0 and a mean squared standardized error
//! (error² / kriging variance) near 1.

use crate::maybe_rayon::*;
use geokrige_core::{Error, Observation, Result};

use super::covariance::CovarianceModel;
use super::kriging::{SimpleKriging, SimpleKrigingParams};

/// Leave-one-out results, indexed like the input observations
#[derive(Debug, Clone)]
pub struct CrossValidation {
    /// Estimate minus observed value
    pub errors: Vec<f64>,
    /// Kriging variance at each withheld location
    pub variances: Vec<f64>,
    /// Mean error (bias)
    pub mean_error: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean kriging variance
    pub mean_variance: f64,
    /// Mean of error² / variance over points with positive variance;
    /// `None` if every variance is zero
    pub mean_squared_standardized_error: Option<f64>,
}

/// Leave-one-out cross-validation.
///
/// Uses `params` for every refit, so with [`KrigingMean::SampleMean`]
/// the mean is recomputed from the K-1 remaining values.
///
/// [`KrigingMean::SampleMean`]: super::KrigingMean::SampleMean
///
/// # Errors
/// Needs at least 2 observations; any failed refit aborts the run.
pub fn cross_validate<C: CovarianceModel + ?Sized>(
    observations: &[Observation],
    covariance: &C,
    params: &SimpleKrigingParams,
) -> Result<CrossValidation> {
    let k = observations.len();
    if k < 2 {
        return Err(Error::InvalidInput(
            "cross-validation needs at least 2 observations".into(),
        ));
    }

    let folds: Vec<(f64, f64)> = (0..k)
        .into_par_iter()
        .map(|i| {
            let training: Vec<Observation> = observations
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, o)| *o)
                .collect();
            let withheld = observations[i];
            let sk = SimpleKriging::fit(&training, covariance, params)?;
            let (estimate, variance) = sk.estimate_at(withheld.x, withheld.y)?;
            Ok((estimate - withheld.value, variance))
        })
        .collect::<Result<Vec<_>>>()?;

    let (errors, variances): (Vec<f64>, Vec<f64>) = folds.into_iter().unzip();
    let n = k as f64;
    let mean_error = errors.iter().sum::<f64>() / n;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt();
    let mean_variance = variances.iter().sum::<f64>() / n;

    let standardized: Vec<f64> = errors
        .iter()
        .zip(&variances)
        .filter(|(_, v)| **v > 0.0)
        .map(|(e, v)| e * e / v)
        .collect();
    let mean_squared_standardized_error = if standardized.is_empty() {
        None
    } else {
        Some(standardized.iter().sum::<f64>() / standardized.len() as f64)
    };

    tracing::debug!(folds = k, mean_error, rmse, "leave-one-out cross-validation");

    Ok(CrossValidation {
        errors,
        variances,
        mean_error,
        rmse,
        mean_variance,
        mean_squared_standardized_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::KrigingMean;
    use approx::assert_relative_eq;

    #[test]
    fn test_cv_uncorrelated_model_predicts_mean() {
        // Pure nugget: withheld values are estimated by the mean of the rest
        let obs = vec![
            Observation::new(0.0, 0.0, 1.0),
            Observation::new(5.0, 0.0, 2.0),
            Observation::new(0.0, 5.0, 3.0),
            Observation::new(5.0, 5.0, 6.0),
        ];
        let nugget = |dx: f64, dy: f64| if dx == 0.0 && dy == 0.0 { 1.0 } else { 0.0 };
        let cv = cross_validate(&obs, &nugget, &SimpleKrigingParams::default()).unwrap();

        // Withholding 1.0 leaves mean (2+3+6)/3
        assert_relative_eq!(cv.errors[0], 11.0 / 3.0 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(cv.errors[3], 2.0 - 6.0, epsilon = 1e-12);
        for v in &cv.variances {
            assert_relative_eq!(*v, 1.0, epsilon = 1e-12);
        }
        assert!(cv.rmse > 0.0);
        assert!(cv.mean_squared_standardized_error.is_some());
    }

    #[test]
    fn test_cv_smooth_field_beats_constant() {
        // Linear field sampled on a 5x5 lattice
        let mut obs = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let (x, y) = (i as f64 * 10.0, j as f64 * 10.0);
                obs.push(Observation::new(x, y, 0.5 * x + 0.2 * y));
            }
        }
        let cov = |dx: f64, dy: f64| 100.0 * (-(dx * dx + dy * dy).sqrt() / 30.0).exp();
        let cv = cross_validate(&obs, &cov, &SimpleKrigingParams::default()).unwrap();

        let (_, spread) = geokrige_core::vector::value_moments(&obs).unwrap();
        assert!(cv.rmse < spread.sqrt(), "rmse {:.3} vs std {:.3}", cv.rmse, spread.sqrt());
        assert_eq!(cv.errors.len(), 25);
    }

    #[test]
    fn test_cv_too_few() {
        let obs = vec![Observation::new(0.0, 0.0, 1.0)];
        let cov = |_: f64, _: f64| 1.0;
        let params = SimpleKrigingParams {
            mean: KrigingMean::Known(0.0),
            ..Default::default()
        };
        assert!(cross_validate(&obs, &cov, &params).unwrap_err().is_invalid_input());
    }
}
