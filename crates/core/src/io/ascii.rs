//! ESRI ASCII grid reading/writing
//!
//! Layout:
//! ```text
//! NCOLS 4
//! NROWS 3
//! XLLCENTER 0.0
//! YLLCENTER 0.0
//! CELLSIZE 10.0
//! NODATA_VALUE -9999
//! <north row values>
//! ...
//! <south row values>
//! ```
//! Rasters store row 0 in the south, so rows are flipped on the way out and
//! back in.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::raster::{GridSpec, Raster, RasterElement};

/// Options for writing ASCII grids
#[derive(Debug, Clone)]
pub struct AsciiGridOptions {
    /// Value substituted for NaN and raster no-data cells
    pub nodata_value: f64,
}

impl Default for AsciiGridOptions {
    fn default() -> Self {
        Self {
            nodata_value: -9999.0,
        }
    }
}

/// Read an ASCII grid file into a Raster
pub fn read_ascii_grid<P: AsRef<Path>>(path: P) -> Result<Raster<f64>> {
    let content = fs::read_to_string(path.as_ref())?;
    tracing::debug!("Read {} bytes from {}", content.len(), path.as_ref().display());
    read_ascii_grid_from_str(&content)
}

/// Parse an ASCII grid from an in-memory string
///
/// No-data cells come back as NaN; the raster's no-data value is left unset.
pub fn read_ascii_grid_from_str(content: &str) -> Result<Raster<f64>> {
    let mut ncols: Option<usize> = None;
    let mut nrows: Option<usize> = None;
    let mut x_center: Option<f64> = None;
    let mut y_center: Option<f64> = None;
    let mut x_corner: Option<f64> = None;
    let mut y_corner: Option<f64> = None;
    let mut cell_size: Option<f64> = None;
    let mut nodata: Option<f64> = None;

    let mut lines = content.lines().enumerate().peekable();
    let mut header_end = 0;

    // Header: keyword lines until the first numeric row
    while let Some((idx, line)) = lines.peek().copied() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            lines.next();
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let key = parts.next().unwrap_or_default();
        if !key.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            break;
        }
        let raw = parts.next().ok_or_else(|| Error::Parse {
            line: idx + 1,
            message: format!("missing value for {}", key),
        })?;
        let number: f64 = raw.parse().map_err(|_| Error::Parse {
            line: idx + 1,
            message: format!("invalid value '{}' for {}", raw, key),
        })?;

        match key.to_ascii_uppercase().as_str() {
            "NCOLS" => ncols = Some(parse_count(number, idx)?),
            "NROWS" => nrows = Some(parse_count(number, idx)?),
            "XLLCENTER" => x_center = Some(number),
            "YLLCENTER" => y_center = Some(number),
            "XLLCORNER" => x_corner = Some(number),
            "YLLCORNER" => y_corner = Some(number),
            "CELLSIZE" => cell_size = Some(number),
            "NODATA_VALUE" => nodata = Some(number),
            other => {
                return Err(Error::Parse {
                    line: idx + 1,
                    message: format!("unknown header key {}", other),
                });
            }
        }
        header_end = idx + 1;
        lines.next();
    }

    let missing = |key: &str| Error::Parse {
        line: 0,
        message: format!("header is missing {}", key),
    };
    let cols = ncols.ok_or_else(|| missing("NCOLS"))?;
    let rows = nrows.ok_or_else(|| missing("NROWS"))?;
    let cell = cell_size.ok_or_else(|| missing("CELLSIZE"))?;
    let origin_x = match (x_center, x_corner) {
        (Some(c), _) => c,
        (None, Some(c)) => c + cell / 2.0,
        (None, None) => return Err(missing("XLLCENTER or XLLCORNER")),
    };
    let origin_y = match (y_center, y_corner) {
        (Some(c), _) => c,
        (None, Some(c)) => c + cell / 2.0,
        (None, None) => return Err(missing("YLLCENTER or YLLCORNER")),
    };
    let grid = GridSpec::new(origin_x, origin_y, cell, rows, cols).map_err(|e| Error::Parse {
        line: header_end,
        message: e.to_string(),
    })?;

    // Body: rows * cols values, north row first. Sized by what is actually
    // present so an inflated header cannot force a huge allocation.
    let mut north_first = Vec::new();
    let mut last_line = 0;
    for (idx, line) in lines {
        last_line = idx + 1;
        for token in line.split_whitespace() {
            let v: f64 = token.parse().map_err(|_| Error::Parse {
                line: idx + 1,
                message: format!("invalid cell value '{}'", token),
            })?;
            let is_nodata = nodata.is_some_and(|nd| v.is_nodata(Some(nd)));
            north_first.push(if is_nodata { f64::NAN } else { v });
        }
    }
    if north_first.len() != grid.len() {
        return Err(Error::Parse {
            line: last_line,
            message: format!(
                "expected {} cell values, found {}",
                grid.len(),
                north_first.len()
            ),
        });
    }

    let data: Vec<f64> = north_first
        .chunks(cols)
        .rev()
        .flatten()
        .copied()
        .collect();
    Raster::from_vec(data, grid)
}

fn parse_count(number: f64, idx: usize) -> Result<usize> {
    if number.fract() != 0.0 || number < 1.0 {
        return Err(Error::Parse {
            line: idx + 1,
            message: format!("expected a positive integer, got {}", number),
        });
    }
    Ok(number as usize)
}

/// Write a Raster to an ASCII grid file
pub fn write_ascii_grid<T, P>(
    raster: &Raster<T>,
    path: P,
    options: Option<AsciiGridOptions>,
) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let text = write_ascii_grid_to_string(raster, options)?;
    let mut file = fs::File::create(path.as_ref())?;
    file.write_all(text.as_bytes())?;
    tracing::debug!(
        "Wrote {}x{} grid to {}",
        raster.cols(),
        raster.rows(),
        path.as_ref().display()
    );
    Ok(())
}

/// Render a Raster as ASCII grid text
pub fn write_ascii_grid_to_string<T>(
    raster: &Raster<T>,
    options: Option<AsciiGridOptions>,
) -> Result<String>
where
    T: RasterElement,
{
    let options = options.unwrap_or_default();
    if !options.nodata_value.is_finite() {
        return Err(Error::InvalidParameter {
            name: "nodata_value",
            value: options.nodata_value.to_string(),
            reason: "must be finite".into(),
        });
    }

    let grid = raster.grid();
    let mut out = String::with_capacity(raster.len() * 12 + 128);
    out.push_str(&format!("NCOLS {}\n", grid.cols));
    out.push_str(&format!("NROWS {}\n", grid.rows));
    out.push_str(&format!("XLLCENTER {}\n", grid.origin_x));
    out.push_str(&format!("YLLCENTER {}\n", grid.origin_y));
    out.push_str(&format!("CELLSIZE {}\n", grid.cell_size));
    out.push_str(&format!("NODATA_VALUE {}\n", options.nodata_value));

    let data = raster.data();
    for row in (0..raster.rows()).rev() {
        let line: Vec<String> = data
            .row(row)
            .iter()
            .map(|&v| match v.as_f64() {
                Some(f) if f.is_finite() && !raster.is_nodata(v) => f.to_string(),
                _ => options.nodata_value.to_string(),
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    Ok(out)
}
