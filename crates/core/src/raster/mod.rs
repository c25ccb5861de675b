//! Grid and raster data structures

mod element;
mod grid;
mod grid_spec;

pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};
pub use grid_spec::GridSpec;
