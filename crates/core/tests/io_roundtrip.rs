//! File-based round trips for ASCII grids and observation files.

use geokrige_core::io::{
    read_ascii_grid, read_observations, write_ascii_grid, AsciiGridOptions,
    ObservationFileOptions,
};
use geokrige_core::{GridSpec, Observation, Raster};
use std::io::Write;

#[test]
fn ascii_grid_file_roundtrip() {
    let grid = GridSpec::new(500.0, 1200.0, 25.0, 4, 5).unwrap();
    let data: Vec<f64> = (0..grid.len()).map(|i| i as f64 * 0.25 - 1.0).collect();
    let mut raster = Raster::from_vec(data, grid).unwrap();
    raster.set(2, 3, f64::NAN).unwrap();

    let tmp = tempfile::Builder::new().suffix(".asc").tempfile().unwrap();
    write_ascii_grid(&raster, tmp.path(), Some(AsciiGridOptions::default())).expect("write failed");

    let reloaded = read_ascii_grid(tmp.path()).expect("re-read failed");
    assert_eq!(reloaded.shape(), raster.shape());
    assert_eq!(reloaded.grid(), raster.grid());

    for row in 0..4 {
        for col in 0..5 {
            let orig = raster.get(row, col).unwrap();
            let copy = reloaded.get(row, col).unwrap();
            if orig.is_nan() {
                assert!(copy.is_nan(), "cell ({row},{col}): expected NaN");
            } else {
                assert_eq!(orig, copy, "cell ({row},{col})");
            }
        }
    }
}

#[test]
fn observation_file_loads() {
    let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(tmp, "easting,northing,porosity").unwrap();
    writeln!(tmp, "0,0,10").unwrap();
    writeln!(tmp, "10,0,20").unwrap();
    writeln!(tmp, "0,10,15").unwrap();
    tmp.flush().unwrap();

    let obs = read_observations(tmp.path(), &ObservationFileOptions::default()).unwrap();
    assert_eq!(
        obs,
        vec![
            Observation::new(0.0, 0.0, 10.0),
            Observation::new(10.0, 0.0, 20.0),
            Observation::new(0.0, 10.0, 15.0),
        ]
    );
}

#[test]
fn missing_file_is_io_error() {
    let err = read_ascii_grid("/nonexistent/geokrige/grid.asc").unwrap_err();
    assert!(matches!(err, geokrige_core::Error::Io(_)));
}
