//! # geokrige Core
//!
//! Core types and I/O for the geokrige spatial interpolation library.
//!
//! This crate provides:
//! - `Observation`: a scalar sample at a 2D location
//! - `GridSpec`: a regular lattice of target nodes
//! - `Raster<T>`: values stored over a `GridSpec`
//! - I/O for ESRI ASCII grids and delimited observation files

pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use error::{Error, Result};
pub use raster::{GridSpec, Raster, RasterElement};
pub use vector::Observation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GridSpec, Raster, RasterElement};
    pub use crate::vector::Observation;
}
