//! Spatial interpolation by simple kriging
//!
//! Estimate a field at arbitrary locations from scattered observations:
//! - Variogram: parameterized semivariance models with geometric anisotropy
//! - Covariance: kernels over lag vectors, including the C(h) = σ² - γ(h) adapter
//! - Simple Kriging: best linear unbiased estimator around a known mean
//! - Cross-validation: leave-one-out diagnostics for a chosen model

mod cholesky;
pub mod covariance;
mod cross_validation;
pub mod kriging;
pub mod variogram;

pub use covariance::{CovarianceModel, SemivarianceCovariance};
pub use cross_validation::{cross_validate, CrossValidation};
pub use geokrige_core::Observation;
pub use kriging::{
    fit_and_estimate, simple_kriging, KrigingEstimate, KrigingMean, KrigingResult,
    SimpleKriging, SimpleKrigingParams,
};
pub use variogram::{Anisotropy, SemivarianceModel, Semivariogram, VariogramModel};
