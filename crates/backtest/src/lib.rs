//! Grid-trading simulation and backtesting engine.
//!
//! This crate provides:
//! - Grid level generation (linear, geometric, Fibonacci spacing)
//! - Bar-driven order matching against a portfolio ledger
//! - Performance metrics over the equity curve and trade log
//! - Run orchestration with cooperative cancellation
//! - Parameter sweeps across independent runs

pub mod event;
pub mod grid;
pub mod ledger;
pub mod matcher;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use event::{EventSink, LogSink, NullSink, RunEvent};
pub use grid::generate_levels;
pub use ledger::{FillOutcome, PortfolioLedger};
pub use matcher::{BarOutcome, OrderMatcher, TOUCH_TOLERANCE};
pub use metrics::compute_metrics;
pub use runner::{BacktestRunner, CancelToken, RunReport, RunState};
pub use sweep::{expand_configs, run_sweep, SweepGrid, SweepOutcome};
