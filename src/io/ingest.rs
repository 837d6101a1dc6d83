//! CSV ingest of sample sets.
//!
//! Turns a small `x,y[,sigma]` table into [`Samples`]:
//! - with headers, columns are found by name (`x`, `y` and an optional error
//!   column named `sigma`, `y_err`, `yerr` or `err`), case-insensitively
//! - without headers, columns are positional: x, y, then optional sigma
//!
//! Any unparsable cell fails the whole load with its line number; a fit on a
//! silently thinned data set is worse than no fit.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Samples;
use crate::error::FitError;

const ERROR_COLUMNS: [&str; 4] = ["sigma", "y_err", "yerr", "err"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    x: usize,
    y: usize,
    sigma: Option<usize>,
}

/// Load a sample set from a CSV file.
pub fn load_samples(path: &Path, has_headers: bool) -> Result<Samples, FitError> {
    let file = File::open(path).map_err(|e| FitError::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);

    let columns = if has_headers {
        resolve_columns(reader.headers()?)?
    } else {
        Columns { x: 0, y: 1, sigma: None }
    };

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut sigma = Vec::new();
    // Positional files carry errors iff the first row has a third cell.
    let mut positional_sigma: Option<bool> = None;

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        x.push(parse_cell(&record, columns.x, "x", line)?);
        y.push(parse_cell(&record, columns.y, "y", line)?);

        let sigma_col = match columns.sigma {
            Some(col) => Some(col),
            None if has_headers => None,
            None => {
                let has_third = *positional_sigma.get_or_insert(record.len() > 2);
                has_third.then_some(2)
            }
        };
        if let Some(col) = sigma_col {
            sigma.push(parse_cell(&record, col, "sigma", line)?);
        }
    }

    if x.is_empty() {
        return Err(FitError::InvalidData(format!(
            "no data rows in '{}'",
            path.display()
        )));
    }

    let samples = Samples::new(x, y);
    let samples = if sigma.is_empty() { samples } else { samples.with_errors(sigma) };
    log::debug!(
        "Loaded {} samples from '{}' (weighted: {})",
        samples.len(),
        path.display(),
        samples.is_weighted()
    );
    Ok(samples)
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, FitError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    let required = |name: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| FitError::InvalidData(format!("missing required column `{name}`")))
    };

    Ok(Columns {
        x: required("x")?,
        y: required("y")?,
        sigma: ERROR_COLUMNS.iter().find_map(|name| header_map.get(*name).copied()),
    })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn parse_cell(record: &StringRecord, col: usize, name: &str, line: u64) -> Result<f64, FitError> {
    let raw = record
        .get(col)
        .ok_or_else(|| FitError::InvalidData(format!("line {line}: missing `{name}` value")))?;
    raw.parse::<f64>().map_err(|_| {
        FitError::InvalidData(format!("line {line}: `{name}` is not a number: '{raw}'"))
    })
}
