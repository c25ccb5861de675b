//! Semivariogram models
//!
//! The semivariance γ(h) measures spatial dissimilarity as a function of
//! the lag vector h. Three model shapes are supported, each with a nugget
//! c₀, a sill and a (major) range a:
//! ```text
//! spherical:   γ(h) = c₀ + (sill - c₀)·[1.5(h/a) - 0.5(h/a)³]   for h < a, sill otherwise
//! exponential: γ(h) = c₀ + (sill - c₀)·[1 - exp(-3h/a)]
//! gaussian:    γ(h) = c₀ + (sill - c₀)·[1 - exp(-3h²/a²)]
//! ```
//! γ(0) = 0 for every model; the nugget applies to any non-zero lag.
//!
//! Geometric anisotropy rotates the lag into the frame of the major axis
//! (azimuth measured clockwise from north) and stretches the minor-axis
//! component by `major / minor` before taking its length, so the model
//! reaches its sill at the major range along the azimuth and at the minor
//! range across it.
//!
//! Reference:
//! Isaaks, E.H., Srivastava, R.M. (1989). An Introduction to Applied
//! Geostatistics. Oxford University Press.

use serde::{Deserialize, Serialize};
use geokrige_core::{Error, Result};

/// Lags shorter than this are treated as zero
const ZERO_LAG: f64 = 1e-12;

/// Theoretical variogram model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariogramModel {
    Spherical,
    Exponential,
    Gaussian,
}

impl std::str::FromStr for VariogramModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spherical" | "sph" => Ok(Self::Spherical),
            "exponential" | "exp" => Ok(Self::Exponential),
            "gaussian" | "gau" => Ok(Self::Gaussian),
            _ => Err(Error::InvalidParameter {
                name: "model",
                value: s.to_string(),
                reason: "expected spherical, exponential or gaussian".into(),
            }),
        }
    }
}

/// Elliptical (geometric) anisotropy of a variogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anisotropy {
    /// Azimuth of the major axis in degrees, clockwise from north
    pub azimuth: f64,
    /// Range along the minor axis
    pub minor_range: f64,
}

/// Anything that maps a lag vector to a semivariance
pub trait SemivarianceModel: Sync {
    /// Semivariance for the lag `(dx, dy)`
    fn semivariance(&self, dx: f64, dy: f64) -> f64;
}

impl<F> SemivarianceModel for F
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    fn semivariance(&self, dx: f64, dy: f64) -> f64 {
        self(dx, dy)
    }
}

/// A parameterized semivariogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Semivariogram {
    pub model: VariogramModel,
    /// Nugget (c₀): discontinuity at the origin
    pub nugget: f64,
    /// Sill: semivariance at which the model levels off (includes the nugget)
    pub sill: f64,
    /// Range along the major axis (the only axis when isotropic)
    pub range: f64,
    /// `None` for an isotropic model
    pub anisotropy: Option<Anisotropy>,
}

impl Semivariogram {
    /// Isotropic model, validated
    pub fn new(model: VariogramModel, nugget: f64, sill: f64, range: f64) -> Result<Self> {
        let variogram = Self {
            model,
            nugget,
            sill,
            range,
            anisotropy: None,
        };
        variogram.validate()?;
        Ok(variogram)
    }

    pub fn spherical(nugget: f64, sill: f64, range: f64) -> Result<Self> {
        Self::new(VariogramModel::Spherical, nugget, sill, range)
    }

    pub fn exponential(nugget: f64, sill: f64, range: f64) -> Result<Self> {
        Self::new(VariogramModel::Exponential, nugget, sill, range)
    }

    pub fn gaussian(nugget: f64, sill: f64, range: f64) -> Result<Self> {
        Self::new(VariogramModel::Gaussian, nugget, sill, range)
    }

    /// Add elliptical anisotropy; `self.range` becomes the major range
    pub fn with_anisotropy(mut self, azimuth: f64, minor_range: f64) -> Result<Self> {
        self.anisotropy = Some(Anisotropy {
            azimuth,
            minor_range,
        });
        self.validate()?;
        Ok(self)
    }

    /// Check that parameters describe a valid model
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &'static str, value: f64, reason: &str| Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        };

        if !(self.range.is_finite() && self.range > 0.0) {
            return Err(invalid("range", self.range, "must be finite and positive"));
        }
        if !(self.nugget.is_finite() && self.nugget >= 0.0) {
            return Err(invalid("nugget", self.nugget, "must be finite and non-negative"));
        }
        if !(self.sill.is_finite() && self.sill >= self.nugget) {
            return Err(invalid("sill", self.sill, "must be finite and at least the nugget"));
        }
        if let Some(aniso) = self.anisotropy {
            if !aniso.azimuth.is_finite() {
                return Err(invalid("azimuth", aniso.azimuth, "must be finite"));
            }
            if !(aniso.minor_range.is_finite() && aniso.minor_range > 0.0) {
                return Err(invalid(
                    "minor_range",
                    aniso.minor_range,
                    "must be finite and positive",
                ));
            }
        }
        Ok(())
    }

    /// Partial sill (sill - nugget)
    pub fn partial_sill(&self) -> f64 {
        self.sill - self.nugget
    }

    /// Length of a lag vector in the isotropic frame of the major range
    pub fn reduced_lag(&self, dx: f64, dy: f64) -> f64 {
        match self.anisotropy {
            None => (dx * dx + dy * dy).sqrt(),
            Some(aniso) => {
                let t = aniso.azimuth.to_radians() + std::f64::consts::FRAC_PI_2;
                let (sin_t, cos_t) = t.sin_cos();
                // Row vector times [[cos t, sin t], [-sin t, cos t]]
                let u = dx * cos_t - dy * sin_t;
                let v = (dx * sin_t + dy * cos_t) * (self.range / aniso.minor_range);
                (u * u + v * v).sqrt()
            }
        }
    }

    /// Evaluate the model at an isotropic lag distance h
    pub fn evaluate(&self, h: f64) -> f64 {
        if h < ZERO_LAG {
            return 0.0;
        }

        let c0 = self.nugget;
        let c = self.partial_sill();
        let a = self.range;

        match self.model {
            VariogramModel::Spherical => {
                if h >= a {
                    self.sill
                } else {
                    let hr = h / a;
                    c0 + c * (1.5 * hr - 0.5 * hr * hr * hr)
                }
            }
            VariogramModel::Exponential => c0 + c * (1.0 - (-3.0 * h / a).exp()),
            VariogramModel::Gaussian => c0 + c * (1.0 - (-3.0 * h * h / (a * a)).exp()),
        }
    }
}

impl SemivarianceModel for Semivariogram {
    fn semivariance(&self, dx: f64, dy: f64) -> f64 {
        self.evaluate(self.reduced_lag(dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spherical_evaluation() {
        let model = Semivariogram::spherical(1.0, 10.0, 50.0).unwrap();

        assert!((model.evaluate(0.0)).abs() < 1e-10);
        assert_relative_eq!(model.evaluate(50.0), 10.0, epsilon = 1e-10);
        assert_relative_eq!(model.evaluate(100.0), 10.0, epsilon = 1e-10);

        let mid = model.evaluate(25.0);
        assert!(mid > 1.0 && mid < 10.0, "Mid should be between nugget and sill: {:.2}", mid);
        // 1 + 9 * (0.75 - 0.0625)
        assert_relative_eq!(mid, 7.1875, epsilon = 1e-10);
    }

    #[test]
    fn test_exponential_evaluation() {
        let model = Semivariogram::exponential(0.0, 10.0, 30.0).unwrap();

        assert!((model.evaluate(0.0)).abs() < 1e-10);
        let at_range = model.evaluate(30.0);
        assert!(
            at_range > 9.0 && at_range < 10.0,
            "At range, should be ~95% of sill: got {:.2}",
            at_range
        );
    }

    #[test]
    fn test_gaussian_evaluation() {
        let model = Semivariogram::gaussian(0.0, 1.0, 100.0).unwrap();
        assert!((model.evaluate(0.0)).abs() < 1e-10);
        assert!((model.evaluate(500.0) - 1.0).abs() < 0.05);
        // Parabolic near the origin
        assert!(model.evaluate(1.0) < 1e-3);
    }

    #[test]
    fn test_isotropic_lag_symmetry() {
        let model = Semivariogram::spherical(0.0, 4.0, 20.0).unwrap();
        assert_relative_eq!(
            model.semivariance(3.0, -7.0),
            model.semivariance(-3.0, 7.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(model.reduced_lag(3.0, 4.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_anisotropy_axes() {
        // Major axis pointing north-east
        let model = Semivariogram::spherical(0.0, 1.0, 100.0)
            .unwrap()
            .with_anisotropy(45.0, 25.0)
            .unwrap();

        let s = std::f64::consts::FRAC_1_SQRT_2;
        // Along the major axis the reduced lag equals the lag
        assert_relative_eq!(model.reduced_lag(50.0 * s, 50.0 * s), 50.0, epsilon = 1e-9);
        // Across it the lag is stretched by major / minor
        assert_relative_eq!(model.reduced_lag(-50.0 * s, 50.0 * s), 200.0, epsilon = 1e-9);

        // Sill reached at the minor range across the major axis
        assert_relative_eq!(model.semivariance(25.0 * s, -25.0 * s), 1.0, epsilon = 1e-9);
        assert!(model.semivariance(25.0 * s, 25.0 * s) < 1.0);
    }

    #[test]
    fn test_anisotropy_north_azimuth() {
        let model = Semivariogram::exponential(0.0, 2.0, 60.0)
            .unwrap()
            .with_anisotropy(0.0, 20.0)
            .unwrap();
        assert_relative_eq!(model.reduced_lag(0.0, 10.0), 10.0, epsilon = 1e-9);
        assert_relative_eq!(model.reduced_lag(10.0, 0.0), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Semivariogram::spherical(0.0, 1.0, 0.0).is_err());
        assert!(Semivariogram::spherical(2.0, 1.0, 10.0).is_err());
        assert!(Semivariogram::spherical(-1.0, 1.0, 10.0).is_err());
        assert!(Semivariogram::gaussian(0.0, f64::NAN, 10.0).is_err());
        let iso = Semivariogram::exponential(0.0, 1.0, 10.0).unwrap();
        assert!(iso.with_anisotropy(30.0, 0.0).is_err());
    }

    #[test]
    fn test_model_from_str() {
        assert_eq!("Spherical".parse::<VariogramModel>().unwrap(), VariogramModel::Spherical);
        assert_eq!("exp".parse::<VariogramModel>().unwrap(), VariogramModel::Exponential);
        assert!("cubic".parse::<VariogramModel>().is_err());
    }

    #[test]
    fn test_closure_model() {
        let linear = |dx: f64, dy: f64| 0.5 * (dx * dx + dy * dy).sqrt();
        assert_relative_eq!(linear.semivariance(6.0, 8.0), 5.0, epsilon = 1e-12);
    }
}
