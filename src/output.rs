//! Output formatting and persistence for result tables.
//!
//! Supports pretty-printing, JSON serialization, and CSV files.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use csv::WriterBuilder;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Prints a value to stdout as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    info!(path = %path.display(), "Wrote JSON");
    Ok(())
}

/// Writes `rows` to a CSV file with a header row, replacing any existing
/// file. Row types must be flat (no nested sequences).
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::HourlyMean;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn rows() -> Vec<HourlyMean> {
        vec![
            HourlyMean { hour: 7, mean_available: 3.5 },
            HourlyMean { hour: 8, mean_available: 1.0 },
        ]
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&rows());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&rows()).unwrap();
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let path = temp_path("bicing_stats_test_hourly.csv");
        let _ = fs::remove_file(&path);

        write_csv(&path, &rows()).unwrap();
        // a second write replaces rather than appends
        write_csv(&path, &rows()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["hour,mean_available", "7,3.5", "8,1.0"]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_roundtrips_as_value() {
        let path = temp_path("bicing_stats_test_hourly.json");
        let _ = fs::remove_file(&path);

        write_json(&path, &rows()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["hour"], 7);

        fs::remove_file(&path).unwrap();
    }
}
