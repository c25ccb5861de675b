//! Regular target lattice

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest node count whose `f64` values fit in one allocation
const MAX_NODES: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// A regular 2D lattice of query nodes.
///
/// Node `(row, col)` sits at:
/// ```text
/// x = origin_x + col * cell_size
/// y = origin_y + row * cell_size
/// ```
/// so `(origin_x, origin_y)` is the centre of the lower-left node and row 0
/// is the southernmost row. Nodes are enumerated row-major starting at row 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// X coordinate of the lower-left node centre
    pub origin_x: f64,
    /// Y coordinate of the lower-left node centre
    pub origin_y: f64,
    /// Node spacing, identical along both axes
    pub cell_size: f64,
    /// Number of rows (along y)
    pub rows: usize,
    /// Number of columns (along x)
    pub cols: usize,
}

impl GridSpec {
    /// Create a grid, validating its dimensions and spacing
    pub fn new(origin_x: f64, origin_y: f64, cell_size: f64, rows: usize, cols: usize) -> Result<Self> {
        let spec = Self {
            origin_x,
            origin_y,
            cell_size,
            rows,
            cols,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Smallest grid with the given spacing whose nodes cover the extent
    /// `(min_x, min_y, max_x, max_y)`.
    pub fn covering(extent: (f64, f64, f64, f64), cell_size: f64) -> Result<Self> {
        let (min_x, min_y, max_x, max_y) = extent;
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "extent",
                value: format!("{:?}", extent),
                reason: "must be finite".into(),
            });
        }
        if !(max_x >= min_x && max_y >= min_y) {
            return Err(Error::InvalidParameter {
                name: "extent",
                value: format!("{:?}", extent),
                reason: "max must not be below min".into(),
            });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::InvalidParameter {
                name: "cell_size",
                value: cell_size.to_string(),
                reason: "must be finite and positive".into(),
            });
        }
        let cols = node_count(max_x - min_x, cell_size, extent)?;
        let rows = node_count(max_y - min_y, cell_size, extent)?;
        Self::new(min_x, min_y, cell_size, rows, cols)
    }

    /// Check spacing, origin and dimensions
    pub fn validate(&self) -> Result<()> {
        let addressable = self
            .rows
            .checked_mul(self.cols)
            .is_some_and(|n| n <= MAX_NODES);
        if self.rows == 0 || self.cols == 0 || !addressable {
            return Err(Error::InvalidDimensions {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(Error::InvalidParameter {
                name: "cell_size",
                value: self.cell_size.to_string(),
                reason: "must be finite and positive".into(),
            });
        }
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "origin",
                value: format!("({}, {})", self.origin_x, self.origin_y),
                reason: "must be finite".into(),
            });
        }
        Ok(())
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of nodes (saturating for grids that fail validation)
    pub fn len(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Whether the grid has no nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinates of node `(row, col)`
    #[inline]
    pub fn node_to_geo(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.cell_size,
            self.origin_y + row as f64 * self.cell_size,
        )
    }

    /// All node coordinates in row-major order
    pub fn nodes(&self) -> Vec<(f64, f64)> {
        let mut nodes = Vec::with_capacity(self.len());
        for row in 0..self.rows {
            for col in 0..self.cols {
                nodes.push(self.node_to_geo(row, col));
            }
        }
        nodes
    }

    /// Bounding box of the cells around the nodes (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let half = self.cell_size / 2.0;
        (
            self.origin_x - half,
            self.origin_y - half,
            self.origin_x + self.cols as f64 * self.cell_size - half,
            self.origin_y + self.rows as f64 * self.cell_size - half,
        )
    }
}

/// Nodes needed along one axis to span `length`
fn node_count(length: f64, cell_size: f64, extent: (f64, f64, f64, f64)) -> Result<usize> {
    let steps = (length / cell_size).ceil();
    if !(steps.is_finite() && steps < usize::MAX as f64) {
        return Err(Error::InvalidParameter {
            name: "extent",
            value: format!("{:?}", extent),
            reason: format!("too large for a cell size of {}", cell_size),
        });
    }
    (steps as usize).checked_add(1).ok_or_else(|| Error::InvalidParameter {
        name: "extent",
        value: format!("{:?}", extent),
        reason: format!("too large for a cell size of {}", cell_size),
    })
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_size: 1.0,
            rows: 100,
            cols: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_node_coordinates() {
        let grid = GridSpec::new(100.0, 200.0, 10.0, 20, 30).unwrap();

        let (x, y) = grid.node_to_geo(5, 10);
        assert_relative_eq!(x, 200.0, epsilon = 1e-10);
        assert_relative_eq!(y, 250.0, epsilon = 1e-10);
    }

    #[test]
    fn test_nodes_row_major() {
        let grid = GridSpec::new(0.0, 0.0, 1.0, 2, 3).unwrap();
        let nodes = grid.nodes();
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes[0], (0.0, 0.0));
        assert_eq!(nodes[2], (2.0, 0.0));
        assert_eq!(nodes[3], (0.0, 1.0));
    }

    #[test]
    fn test_bounds() {
        let grid = GridSpec::new(0.5, 0.5, 1.0, 100, 100).unwrap();
        let (min_x, min_y, max_x, max_y) = grid.bounds();

        assert_relative_eq!(min_x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(min_y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(max_x, 100.0, epsilon = 1e-10);
        assert_relative_eq!(max_y, 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_covering() {
        let grid = GridSpec::covering((0.0, 0.0, 10.0, 5.0), 2.0).unwrap();
        assert_eq!(grid.shape(), (4, 6));
        assert_eq!(grid.node_to_geo(3, 5), (10.0, 6.0));
    }

    #[test]
    fn test_invalid_grid() {
        assert!(GridSpec::new(0.0, 0.0, 1.0, 0, 10).is_err());
        assert!(GridSpec::new(0.0, 0.0, -1.0, 10, 10).is_err());
        assert!(GridSpec::new(f64::NAN, 0.0, 1.0, 10, 10).is_err());
    }

    #[test]
    fn test_node_count_overflow() {
        let err = GridSpec::new(0.0, 0.0, 1.0, usize::MAX / 2, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }), "{err}");
        assert!(GridSpec::new(0.0, 0.0, 1.0, 1 << 40, 1 << 40).is_err());
    }

    #[test]
    fn test_covering_rejects_oversized_extent() {
        assert!(GridSpec::covering((0.0, 0.0, 1e300, 1.0), 1e-10).is_err());
        assert!(GridSpec::covering((0.0, 0.0, f64::INFINITY, 1.0), 1.0).is_err());
        assert!(GridSpec::covering((f64::NAN, 0.0, 1.0, 1.0), 1.0).is_err());
        let err = GridSpec::covering((0.0, 0.0, 1e10, 1e10), 1e-10).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. } | Error::InvalidDimensions { .. }), "{err}");
    }
}
