//! Structured run events.
//!
//! The engine emits events at the points a collaborator would want to
//! forward (notifications, dashboards, persistence). The `EventSink` trait
//! is the only seam: the core never talks to a network or a channel
//! itself.

use grid_core::{MetricsReport, Order, RunMode, Trade};
use serde::Serialize;

/// An event emitted during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// A run started consuming bars.
    Started { symbol: String, mode: RunMode },
    /// The grid was computed from the first bar.
    LevelsComputed { levels: Vec<f64> },
    /// An order filled against the ledger.
    OrderFilled { trade: Trade },
    /// An order was rejected for insolvency.
    OrderRejected { order: Order },
    /// The run consumed all data and produced its report.
    Completed { metrics: MetricsReport },
}

/// Receiver for run events.
pub trait EventSink {
    fn on_event(&mut self, event: &RunEvent);
}

/// Sink that discards all events.
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &RunEvent) {}
}

/// Sink that forwards events to `tracing`.
pub struct LogSink;

impl EventSink for LogSink {
    fn on_event(&mut self, event: &RunEvent) {
        match event {
            RunEvent::Started { symbol, mode } => {
                tracing::info!(%symbol, ?mode, "run started");
            }
            RunEvent::LevelsComputed { levels } => {
                tracing::debug!(count = levels.len(), "grid levels computed");
            }
            RunEvent::OrderFilled { trade } => {
                tracing::debug!(
                    order_id = trade.order_id,
                    side = ?trade.side,
                    price = trade.price,
                    amount = trade.amount,
                    "order filled"
                );
            }
            RunEvent::OrderRejected { order } => {
                tracing::debug!(order_id = order.id, side = ?order.side, "order rejected");
            }
            RunEvent::Completed { metrics } => {
                tracing::info!(
                    total_trades = metrics.total_trades,
                    total_return_pct = metrics.total_return_pct,
                    "run completed"
                );
            }
        }
    }
}
