//! Trading strategy framework.
//!
//! Defines the contract the simulator drives strategies through, plus the
//! concrete news-momentum implementation.

pub mod news_momentum;
pub mod traits;

pub use news_momentum::{NewsMomentumConfig, NewsMomentumStrategy};
pub use traits::{Signals, Strategy};
