//! Market data sources for the grid-trader system.
//!
//! This crate handles:
//! - The `BarSource` abstraction consumed by the run loop
//! - Seeded synthetic random-walk data for simulation runs
//! - Historical bar series and CSV loading for backtest runs
//!
//! No component here performs network access; historical data is supplied
//! by a collaborator (in-memory or as a file).

pub mod historical;
pub mod synthetic;

pub use historical::{load_bars_csv, HistoricalSource};
pub use synthetic::{RandomWalkConfig, RandomWalkSource};

use grid_core::PriceBar;

/// A lazy, finite, restartable sequence of price bars.
///
/// Bars must be produced in strictly increasing timestamp order. After
/// `next_bar` returns `None` the source is exhausted; `reset` rewinds it to
/// the beginning and must reproduce the identical sequence.
pub trait BarSource {
    /// Produce the next bar, or `None` when the data is exhausted.
    fn next_bar(&mut self) -> Option<PriceBar>;

    /// Rewind to the start of the sequence.
    fn reset(&mut self);
}
