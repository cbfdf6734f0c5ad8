//! Event-driven backtesting: simulator, position bookkeeping, reporting.

pub mod engine;
pub mod position;
pub mod report;

pub use engine::Backtester;
pub use position::{Position, PositionBook, TradeRecord};
pub use report::{read_trades_csv, render_trade_log, write_trades_csv, write_trades_json, ExportError};

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Signal-to-fill latency in milliseconds
    pub latency_ms: f64,
    /// Proportional commission per fill (rate on notional)
    pub commission_rate: f64,
    /// Subtract round-trip commission from trade PnL
    pub net_of_commission: bool,
    /// Emit a progress log line every this many dispatched events
    pub progress_interval: u64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            latency_ms: 200.0,
            commission_rate: 1e-4,
            net_of_commission: false,
            progress_interval: 100_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_contract() {
        let config = BacktestConfig::default();
        assert_eq!(config.latency_ms, 200.0);
        assert_eq!(config.commission_rate, 1e-4);
        assert!(!config.net_of_commission);
        assert_eq!(config.progress_interval, 100_000);
    }
}
