//! # GeoKrige Algorithms
//!
//! Geostatistical interpolation for GeoKrige.
//!
//! ## Available Algorithm Categories
//!
//! - **interpolation**: Simple kriging, variogram models, covariance kernels,
//!   leave-one-out cross-validation

pub mod interpolation;
pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        cross_validate, fit_and_estimate, simple_kriging, CovarianceModel, CrossValidation,
        KrigingEstimate, KrigingMean, KrigingResult, SemivarianceCovariance, SemivarianceModel,
        Semivariogram, SimpleKriging, SimpleKrigingParams, VariogramModel,
    };
    pub use geokrige_core::prelude::*;
}
