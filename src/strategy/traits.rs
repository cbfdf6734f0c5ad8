//! Core strategy trait definitions

use crate::core::events::{FillEvent, MarketUpdateEvent, SignalEvent};
use crate::regime::Regime;
use smallvec::SmallVec;

/// Signals produced by one market update; almost always zero or one
pub type Signals = SmallVec<[SignalEvent; 2]>;

/// Contract between the simulator and a trading strategy.
///
/// The simulator routes every market update for the strategy's symbol to
/// [`Strategy::process_market_update`] and reports each of its fills back
/// through [`Strategy::on_fill`] so the strategy can track its own
/// position state.
pub trait Strategy {
    /// Consume one market update and emit any resulting signals
    fn process_market_update(&mut self, event: &MarketUpdateEvent) -> Signals;

    /// Called for every fill belonging to this strategy's symbol
    fn on_fill(&mut self, fill: &FillEvent);

    /// Current regime label from the strategy's classifier, if it has one.
    ///
    /// The simulator stamps this on positions it opens.
    fn current_regime(&self) -> Option<Regime> {
        None
    }
}
