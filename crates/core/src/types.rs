//! Core data types for the grid-trader system.

use serde::{Deserialize, Serialize};

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Size/quantity in base currency.
pub type Size = f64;

/// Milliseconds in one (non-leap) year, used to annualize bar returns.
pub const MS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// A single OHLCV price bar.
///
/// Bars are immutable and arrive in strictly increasing timestamp order.
/// Only `close` participates in grid matching; the remaining fields are
/// carried for completeness and for downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar timestamp in milliseconds.
    pub ts_ms: TimestampMs,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Volume over the bar.
    pub volume: Size,
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

/// Order lifecycle status.
///
/// The simulator fills or rejects synchronously, so in practice no order
/// survives its bar with status `Open`. Status is terminal once it leaves
/// `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Filled,
    Rejected,
}

/// A simulated order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Sequence number, unique within a run.
    pub id: u64,
    /// Creation timestamp (the bar that produced it).
    pub ts_ms: TimestampMs,
    /// Order price (the touched grid level).
    pub price: f64,
    /// Amount in base currency.
    pub amount: Size,
    /// Buy or sell.
    pub side: Side,
    /// Limit or market.
    pub order_type: OrderType,
    /// Current status.
    pub status: OrderStatus,
}

/// An executed fill, appended to the run's trade history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Id of the order that produced this fill.
    pub order_id: u64,
    /// Fill timestamp.
    pub ts_ms: TimestampMs,
    /// Fill price.
    pub price: f64,
    /// Fill amount in base currency.
    pub amount: Size,
    /// Buy or sell.
    pub side: Side,
    /// Fee paid in quote currency.
    pub fee: f64,
    /// Realized profit, defined for sell fills only.
    pub realized_profit: Option<f64>,
}

/// Portfolio snapshot at a mark price.
///
/// Invariant: `cash >= 0` and `position >= 0` at all times — no short
/// selling, no margin. A fill that would violate this is rejected whole,
/// never partially applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Cash in quote currency.
    pub cash: f64,
    /// Position in base currency.
    pub position: Size,
    /// `cash + position * mark_price`.
    pub total_value: f64,
}

/// One equity curve point, appended exactly once per consumed bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquitySample {
    /// Bar timestamp.
    pub ts_ms: TimestampMs,
    /// Marked portfolio value.
    pub value: f64,
    /// Mark price (bar close).
    pub price: f64,
}

/// Performance metrics over a completed run.
///
/// Recomputed from scratch on every call, never mutated incrementally.
/// Field names are part of the serialized contract consumed by the
/// API/dashboard layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Total return over the run, percent.
    pub total_return_pct: f64,
    /// Annualized Sharpe ratio of bar-over-bar returns.
    pub sharpe_ratio: f64,
    /// Maximum peak-to-trough drawdown, percent (always <= 0).
    pub max_drawdown_pct: f64,
    /// Share of profitable trades among trades with a defined profit, percent.
    pub win_rate_pct: f64,
    /// Gross wins / gross losses; `f64::INFINITY` with wins and no losses.
    pub profit_factor: f64,
    /// Total number of executed trades.
    pub total_trades: u32,
    /// Mean realized profit per trade with a defined profit.
    pub avg_trade: f64,
}

/// Grid spacing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    /// Evenly spaced between the bounds.
    Linear,
    /// Evenly spaced in log-space (tighter near the lower bound).
    Geometric,
    /// Normalized cumulative Fibonacci ratios (wider toward the upper bound).
    Fibonacci,
}

/// Run mode. The engine itself is mode-agnostic; the field records which
/// kind of data source the caller wired up and travels with the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Simulation,
    Backtest,
}
