//! Point observations

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A scalar sample at a known 2D location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Build observations from parallel coordinate and value columns.
    ///
    /// Fails with [`Error::InvalidInput`] when the columns differ in length.
    pub fn from_columns(xs: &[f64], ys: &[f64], values: &[f64]) -> Result<Vec<Self>> {
        if xs.len() != ys.len() || xs.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "column lengths differ: x={}, y={}, value={}",
                xs.len(),
                ys.len(),
                values.len()
            )));
        }
        Ok(xs
            .iter()
            .zip(ys)
            .zip(values)
            .map(|((&x, &y), &value)| Self::new(x, y, value))
            .collect())
    }

    /// Location as an `(x, y)` tuple
    #[inline]
    pub fn location(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Displacement from `(x, y)` to this observation
    #[inline]
    pub fn offset_from(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x - x, self.y - y)
    }

    /// Whether location and value are all finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.value.is_finite()
    }
}

/// Zip query coordinate columns into `(x, y)` points.
///
/// Fails with [`Error::InvalidInput`] when the columns differ in length.
pub fn points_from_columns(xs: &[f64], ys: &[f64]) -> Result<Vec<(f64, f64)>> {
    if xs.len() != ys.len() {
        return Err(Error::InvalidInput(format!(
            "query column lengths differ: x={}, y={}",
            xs.len(),
            ys.len()
        )));
    }
    Ok(xs.iter().copied().zip(ys.iter().copied()).collect())
}

/// Arithmetic mean and population variance of the observed values.
///
/// Returns `None` for an empty slice.
pub fn value_moments(observations: &[Observation]) -> Option<(f64, f64)> {
    if observations.is_empty() {
        return None;
    }
    let n = observations.len() as f64;
    let mean = observations.iter().map(|o| o.value).sum::<f64>() / n;
    let variance = observations
        .iter()
        .map(|o| (o.value - mean).powi(2))
        .sum::<f64>()
        / n;
    Some((mean, variance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_columns() {
        let obs = Observation::from_columns(&[0.0, 1.0], &[2.0, 3.0], &[4.0, 5.0]).unwrap();
        assert_eq!(obs[1], Observation::new(1.0, 3.0, 5.0));
    }

    #[test]
    fn test_from_columns_mismatch() {
        let err = Observation::from_columns(&[0.0, 1.0], &[2.0], &[4.0, 5.0]).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(points_from_columns(&[0.0], &[]).is_err());
    }

    #[test]
    fn test_value_moments() {
        let obs = vec![
            Observation::new(0.0, 0.0, 10.0),
            Observation::new(10.0, 0.0, 20.0),
            Observation::new(0.0, 10.0, 15.0),
        ];
        let (mean, var) = value_moments(&obs).unwrap();
        assert_relative_eq!(mean, 15.0, epsilon = 1e-12);
        assert_relative_eq!(var, 50.0 / 3.0, epsilon = 1e-12);
        assert!(value_moments(&[]).is_none());
    }

    #[test]
    fn test_offset_and_finite() {
        let obs = Observation::new(3.0, 4.0, 1.0);
        assert_eq!(obs.offset_from(1.0, 1.0), (2.0, 3.0));
        assert!(!Observation::new(f64::NAN, 0.0, 1.0).is_finite());
    }
}
