//! CSV reading and writing for the demo binary. One record per line,
//! comma-separated decimals, no header, no quoting — built on the `csv`
//! crate rather than hand-rolled splitting.

use std::io;
use std::path::Path;

use crate::error::Error;

fn csv_err(err: ::csv::Error) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidData, err))
}

fn parse_field(field: &str) -> Result<f64, Error> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Reads a CSV file of equal-length rows into a dense `Vec<Vec<f64>>`.
pub fn read_matrix(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>, Error> {
    let mut reader = ::csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let row = record.iter().map(parse_field).collect::<Result<Vec<f64>, Error>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Reads a single-column CSV file into a flat `Vec<f64>`, for 1-D series.
pub fn read_vector(path: impl AsRef<Path>) -> Result<Vec<f64>, Error> {
    let mut reader = ::csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let field = record.get(0).ok_or_else(|| {
            Error::Io(io::Error::new(io::ErrorKind::InvalidData, "empty row in single-column CSV"))
        })?;
        values.push(parse_field(field)?);
    }
    Ok(values)
}

/// Writes each row of `rows` followed by its corresponding anomaly score
/// as the final column.
pub fn write_scored_rows(path: impl AsRef<Path>, rows: &[Vec<f64>], scores: &[f64]) -> Result<(), Error> {
    let mut writer = ::csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    for (row, &score) in rows.iter().zip(scores.iter()) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(score.to_string());
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

impl From<::csv::Error> for Error {
    fn from(err: ::csv::Error) -> Self {
        csv_err(err)
    }
}
