//! Trade log rendering and export.

use crate::backtest::position::TradeRecord;
use crate::regime::Regime;
use chrono::DateTime;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CSV_HEADER: &str = "Entry_Time,Exit_Time,Symbol,Entry_Price,Exit_Price,Quantity,PnL,Regime";

/// Errors from trade log export or re-import
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write trade log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed trade log row at line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    #[error("failed to serialize trade log: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the trade log as CSV: raw microsecond timestamps and two-decimal
/// fixed-precision floats
pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{CSV_HEADER}").map_err(io_err)?;
    for trade in trades {
        writeln!(
            writer,
            "{},{},{},{:.2},{:.2},{:.2},{:.2},{}",
            trade.entry_timestamp_us,
            trade.exit_timestamp_us,
            trade.symbol,
            trade.entry_price,
            trade.exit_price,
            trade.quantity,
            trade.pnl,
            trade.regime
        )
        .map_err(io_err)?;
    }
    writer.flush().map_err(io_err)
}

/// Read a trade log back from its CSV serialisation
pub fn read_trades_csv(path: &Path) -> Result<Vec<TradeRecord>, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);

    let mut trades = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| ExportError::Malformed {
            line: err.position().map_or(0, csv::Position::line),
            reason: err.to_string(),
        })?;
        let line = record.position().map_or(0, csv::Position::line);
        let malformed = |reason: String| ExportError::Malformed { line, reason };

        if record.len() != 8 {
            return Err(malformed(format!("expected 8 fields, found {}", record.len())));
        }

        trades.push(TradeRecord {
            entry_timestamp_us: record[0]
                .parse()
                .map_err(|e| malformed(format!("entry time: {e}")))?,
            exit_timestamp_us: record[1]
                .parse()
                .map_err(|e| malformed(format!("exit time: {e}")))?,
            symbol: record[2].to_string(),
            entry_price: record[3]
                .parse()
                .map_err(|e| malformed(format!("entry price: {e}")))?,
            exit_price: record[4]
                .parse()
                .map_err(|e| malformed(format!("exit price: {e}")))?,
            quantity: record[5]
                .parse()
                .map_err(|e| malformed(format!("quantity: {e}")))?,
            pnl: record[6]
                .parse()
                .map_err(|e| malformed(format!("pnl: {e}")))?,
            regime: record[7]
                .parse::<Regime>()
                .map_err(|e| malformed(e))?,
            commission: 0.0,
        });
    }
    Ok(trades)
}

/// Write the trade log as a pretty-printed JSON artifact
pub fn write_trades_json(path: &Path, trades: &[TradeRecord]) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(trades)?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Render the trade log as an aligned human-readable table with totals
pub fn render_trade_log(trades: &[TradeRecord]) -> String {
    let mut out = String::new();
    out.push_str("TRADE LOG\n");

    if trades.is_empty() {
        out.push_str("No trades executed.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<10} {:<26} {:<26} {:>12} {:>12} {:>10} {:>12} {:>10}",
        "Symbol", "Entry Time", "Exit Time", "Entry Price", "Exit Price", "Quantity", "PnL",
        "Regime"
    );
    let _ = writeln!(out, "{}", "-".repeat(124));

    let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
    for trade in trades {
        let _ = writeln!(
            out,
            "{:<10} {:<26} {:<26} {:>12.2} {:>12.2} {:>10.2} {:>12.2} {:>10}",
            trade.symbol,
            format_timestamp(trade.entry_timestamp_us),
            format_timestamp(trade.exit_timestamp_us),
            trade.entry_price,
            trade.exit_price,
            trade.quantity,
            trade.pnl,
            trade.regime
        );
    }

    let _ = writeln!(out, "{}", "-".repeat(124));
    let _ = writeln!(out, "Total Trades: {}", trades.len());
    let _ = writeln!(out, "Total PnL: {total_pnl:.2}");
    out
}

/// Render a microsecond timestamp as a UTC datetime, falling back to the
/// raw value outside chrono's representable range
fn format_timestamp(timestamp_us: i64) -> String {
    match DateTime::from_timestamp_micros(timestamp_us) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        None => timestamp_us.to_string(),
    }
}
