//! Delimited text observation files (`x,y,value` rows)

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::vector::Observation;

/// Layout of an observation file
#[derive(Debug, Clone)]
pub struct ObservationFileOptions {
    /// Column separator
    pub delimiter: char,
    /// Skip the first non-empty line
    pub has_header: bool,
    /// Lines starting with this prefix are ignored
    pub comment_prefix: Option<char>,
    /// 0-based column indices of x, y and value
    pub x_column: usize,
    pub y_column: usize,
    pub value_column: usize,
}

impl Default for ObservationFileOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
            comment_prefix: Some('#'),
            x_column: 0,
            y_column: 1,
            value_column: 2,
        }
    }
}

/// Load observations from a delimited text file
pub fn read_observations<P: AsRef<Path>>(
    path: P,
    options: &ObservationFileOptions,
) -> Result<Vec<Observation>> {
    let content = fs::read_to_string(path.as_ref())?;
    let observations = parse_observations(&content, options)?;
    tracing::debug!(
        "Loaded {} observations from {}",
        observations.len(),
        path.as_ref().display()
    );
    Ok(observations)
}

/// Parse observations from delimited text
///
/// Every data row must yield three finite numbers; the first bad row aborts
/// the parse with its 1-based line number.
pub fn parse_observations(content: &str, options: &ObservationFileOptions) -> Result<Vec<Observation>> {
    let mut observations = Vec::new();
    let mut header_pending = options.has_header;
    let max_col = options
        .x_column
        .max(options.y_column)
        .max(options.value_column);

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(prefix) = options.comment_prefix
            && trimmed.starts_with(prefix)
        {
            continue;
        }
        if header_pending {
            header_pending = false;
            continue;
        }

        let parts: Vec<&str> = trimmed.split(options.delimiter).map(str::trim).collect();
        if parts.len() <= max_col {
            return Err(Error::Parse {
                line: idx + 1,
                message: format!(
                    "expected at least {} columns, got {}",
                    max_col + 1,
                    parts.len()
                ),
            });
        }

        let field = |col: usize, name: &str| -> Result<f64> {
            let raw = parts[col];
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(Error::Parse {
                    line: idx + 1,
                    message: format!("invalid {} '{}'", name, raw),
                }),
            }
        };

        observations.push(Observation::new(
            field(options.x_column, "x")?,
            field(options.y_column, "y")?,
            field(options.value_column, "value")?,
        ));
    }

    if observations.is_empty() {
        return Err(Error::InvalidInput("no observations found".into()));
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let text = "x,y,porosity\n0,0,10\n# skipped\n\n10, 0, 20\n0,10,15.5\n";
        let obs = parse_observations(text, &ObservationFileOptions::default()).unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[1], Observation::new(10.0, 0.0, 20.0));
        assert_eq!(obs[2].value, 15.5);
    }

    #[test]
    fn test_parse_custom_columns() {
        let options = ObservationFileOptions {
            delimiter: ';',
            has_header: false,
            value_column: 0,
            x_column: 1,
            y_column: 2,
            ..Default::default()
        };
        let obs = parse_observations("7;1;2\n", &options).unwrap();
        assert_eq!(obs[0], Observation::new(1.0, 2.0, 7.0));
    }

    #[test]
    fn test_parse_bad_row() {
        let text = "x,y,v\n0,0,1\n1,nan,2\n";
        let err = parse_observations(text, &ObservationFileOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }), "{err}");

        let short = "x,y,v\n0,0\n";
        assert!(matches!(
            parse_observations(short, &ObservationFileOptions::default()),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_empty() {
        let err = parse_observations("x,y,v\n", &ObservationFileOptions::default()).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
