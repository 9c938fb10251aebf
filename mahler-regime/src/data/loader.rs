//! Tick loader for CSV files.
//!
//! Expected columns (header required, order free):
//! - timestamp: Unix seconds, optional; the row index is used when empty
//! - price
//! - volume
//!
//! Values are parsed as given, including `NaN` and `inf`; the detector
//! decides what to do with them.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::types::Tick;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One CSV row.
#[derive(Debug, Deserialize)]
struct TickRecord {
    #[serde(default)]
    timestamp: Option<f64>,
    price: f64,
    volume: f64,
}

/// Read ticks from a CSV reader.
pub fn read_ticks<R: std::io::Read>(reader: R) -> Result<Vec<Tick>, LoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut ticks = Vec::new();
    for (row, result) in csv_reader.deserialize().enumerate() {
        let record: TickRecord = result?;
        let timestamp = record.timestamp.unwrap_or(row as f64);
        ticks.push(Tick::new(record.price, record.volume, timestamp));
    }

    if ticks.is_empty() {
        return Err(LoaderError::InvalidData("no ticks in input".to_string()));
    }
    Ok(ticks)
}

/// Load ticks from a CSV file.
pub fn load_ticks(path: impl AsRef<Path>) -> Result<Vec<Tick>, LoaderError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    read_ticks(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ticks() {
        let input = "timestamp,price,volume\n1.0,100.5,10\n2.0, 101.0 ,12\n";
        let ticks = read_ticks(input.as_bytes()).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[1], Tick::new(101.0, 12.0, 2.0));
    }

    #[test]
    fn test_missing_timestamp_uses_row() {
        let input = "price,volume,timestamp\n100,1,\n101,1,\n";
        let ticks = read_ticks(input.as_bytes()).unwrap();
        assert_eq!(ticks[0].timestamp, 0.0);
        assert_eq!(ticks[1].timestamp, 1.0);
    }

    #[test]
    fn test_non_finite_values_parse() {
        let input = "timestamp,price,volume\n1,NaN,inf\n";
        let ticks = read_ticks(input.as_bytes()).unwrap();
        assert!(ticks[0].price.is_nan());
        assert!(ticks[0].volume.is_infinite());
    }

    #[test]
    fn test_bad_row() {
        let input = "timestamp,price,volume\n1,abc,1\n";
        assert!(matches!(read_ticks(input.as_bytes()), Err(LoaderError::Csv(_))));
    }

    #[test]
    fn test_empty_input() {
        let input = "timestamp,price,volume\n";
        assert!(matches!(
            read_ticks(input.as_bytes()),
            Err(LoaderError::InvalidData(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_ticks("/definitely/not/here.csv"),
            Err(LoaderError::FileNotFound(_))
        ));
    }
}
