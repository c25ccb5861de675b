//! I/O for grids and observation files

mod ascii;
mod points;

pub use ascii::{
    read_ascii_grid, read_ascii_grid_from_str, write_ascii_grid, write_ascii_grid_to_string,
    AsciiGridOptions,
};
pub use points::{parse_observations, read_observations, ObservationFileOptions};
