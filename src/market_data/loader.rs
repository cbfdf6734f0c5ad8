//! CSV tick ingestion.
//!
//! Expected encoding: a header line followed by comma-separated records of
//! `Timestamp,Price,Volume,Bid_Size,Ask_Size`. Fields are positional; the
//! header content is discarded. Unparseable timestamps degrade to 0, any
//! other malformed field aborts the load.

use crate::core::types::Tick;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors from the tick ingestion layer
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open tick CSV {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tick CSV row at line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    #[error("tick CSV {path} contains no data rows")]
    Empty { path: PathBuf },
}

/// Load all ticks from a CSV file, in file order
pub fn load_ticks_csv(path: &Path) -> Result<Vec<Tick>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut ticks = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| LoadError::Malformed {
            line: err.position().map_or(0, csv::Position::line),
            reason: err.to_string(),
        })?;
        let line = record.position().map_or(0, csv::Position::line);

        if record.len() < 5 {
            return Err(LoadError::Malformed {
                line,
                reason: format!("expected 5 fields, found {}", record.len()),
            });
        }

        // Timestamps that fail to parse degrade to 0 rather than aborting.
        let timestamp_us = record[0].parse::<i64>().unwrap_or(0);

        ticks.push(Tick {
            timestamp_us,
            price: parse_field(&record, 1, "price", line)?,
            volume: parse_field(&record, 2, "volume", line)?,
            bid_size: parse_field(&record, 3, "bid_size", line)?,
            ask_size: parse_field(&record, 4, "ask_size", line)?,
        });
    }

    Ok(ticks)
}

fn parse_field<T>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<T, LoadError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    record[index].parse().map_err(|err| LoadError::Malformed {
        line,
        reason: format!("{name}: {err}"),
    })
}
