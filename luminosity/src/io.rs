//! Loaders for tabulated luminosity functions and Schechter parameter files.
//!
//! Two formats are supported:
//!
//! - **Tabulated curve**: whitespace-delimited `magnitude log10(n(<M))`
//!   columns, ascending in magnitude. Blank lines and `#` comments are
//!   skipped.
//! - **Parameter file**: comma-delimited, a three-line header followed by
//!   one row `Phi_star, M_star, alpha, P, Q`.

use std::path::Path;

use crate::error::{LuminosityError, Result};
use crate::model::Evolution;
use crate::schechter::SchechterParameters;

/// Number of header lines preceding the parameter row.
pub const PARAMETER_HEADER_LINES: usize = 3;

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| LuminosityError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_field(path: &Path, line: usize, field: &str) -> Result<f64> {
    field.trim().parse::<f64>().map_err(|_| LuminosityError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("invalid number '{}'", field.trim()),
    })
}

/// Parse tabulated `(magnitude, log10 density)` columns from text.
pub fn parse_tabulated(path: &Path, contents: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut magnitudes = Vec::new();
    let mut log_densities = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(LuminosityError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                message: format!("expected 2 columns, found {}", fields.len()),
            });
        }

        magnitudes.push(parse_field(path, index + 1, fields[0])?);
        log_densities.push(parse_field(path, index + 1, fields[1])?);
    }

    if magnitudes.len() < 2 {
        return Err(LuminosityError::Configuration(format!(
            "{} holds {} rows, at least 2 are needed",
            path.display(),
            magnitudes.len()
        )));
    }

    Ok((magnitudes, log_densities))
}

/// Load a tabulated cumulative luminosity function.
pub fn load_tabulated(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let contents = read(path)?;
    parse_tabulated(path, &contents)
}

/// Parse the Schechter parameter row that follows the header.
pub fn parse_schechter_parameters(
    path: &Path,
    contents: &str,
) -> Result<(SchechterParameters, Evolution)> {
    let (index, row) = contents
        .lines()
        .enumerate()
        .skip(PARAMETER_HEADER_LINES)
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or_else(|| {
            LuminosityError::Configuration(format!(
                "{} has no parameter row after the {PARAMETER_HEADER_LINES}-line header",
                path.display()
            ))
        })?;

    let values = row
        .split(',')
        .map(|field| parse_field(path, index + 1, field))
        .collect::<Result<Vec<f64>>>()?;

    if values.len() != 5 {
        return Err(LuminosityError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            message: format!(
                "expected Phi_star, M_star, alpha, P, Q; found {} values",
                values.len()
            ),
        });
    }

    let params = SchechterParameters {
        phi_star: values[0],
        m_star: values[1],
        alpha: values[2],
    };
    Ok((params, Evolution::new(values[3], values[4])))
}

/// Load Schechter parameters and their evolution from a parameter file.
pub fn load_schechter_parameters(path: &Path) -> Result<(SchechterParameters, Evolution)> {
    let contents = read(path)?;
    parse_schechter_parameters(path, &contents)
}
