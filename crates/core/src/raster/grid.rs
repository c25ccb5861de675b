//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{GridSpec, RasterElement};
use ndarray::Array2;

/// Values laid out over a [`GridSpec`].
///
/// Storage is `(row, col)` with row 0 the southernmost row, matching the
/// node order of the grid. Writers that need north-up output (ESRI ASCII)
/// flip rows themselves.
///
/// # Example
///
/// ```ignore
/// use geokrige_core::{GridSpec, Raster};
///
/// let grid = GridSpec::new(0.0, 0.0, 10.0, 50, 80)?;
/// let mut raster: Raster<f64> = Raster::new(grid);
/// raster.set(10, 20, 42.0)?;
/// let value = raster.get(10, 20)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
    grid: GridSpec,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(grid: GridSpec) -> Self {
        Self {
            data: Array2::zeros((grid.rows, grid.cols)),
            grid,
            nodata: None,
        }
    }

    /// Create a raster from row-major data in grid node order
    pub fn from_vec(data: Vec<T>, grid: GridSpec) -> Result<Self> {
        if data.len() != grid.len() {
            return Err(Error::InvalidInput(format!(
                "{} values for a {}x{} grid",
                data.len(),
                grid.cols,
                grid.rows
            )));
        }

        let array = Array2::from_shape_vec((grid.rows, grid.cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            data: array,
            grid,
            nodata: None,
        })
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    // Metadata

    /// Grid the values are laid out on
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Node spacing
    pub fn cell_size(&self) -> f64 {
        self.grid.cell_size
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.grid.bounds()
    }

    /// Coordinates of node `(row, col)`
    pub fn node_to_geo(&self, row: usize, col: usize) -> (f64, f64) {
        self.grid.node_to_geo(row, col)
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean, count of valid cells)
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }

            if min.is_none_or(|m| value < m) {
                min = Some(value);
            }
            if max.is_none_or(|m| value > m) {
                max = Some(value);
            }

            if let Some(v) = value.as_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}
