//! Order-matching simulator.
//!
//! Consumes one price bar at a time against a fixed grid, decides which
//! levels are touched, and requests fills from the portfolio ledger. There
//! is no persisted open-order state: every order resolves to filled or
//! rejected within the bar that created it.

use grid_core::{Order, OrderStatus, OrderType, PriceBar, Side, Trade};
use ordered_float::OrderedFloat;

use crate::ledger::{FillOutcome, PortfolioLedger};

/// A level is touched when the close is within this relative distance.
pub const TOUCH_TOLERANCE: f64 = 0.001;

/// Orders and trades produced by one bar.
#[derive(Debug, Default)]
pub struct BarOutcome {
    /// Every order created this bar, filled or rejected.
    pub orders: Vec<Order>,
    /// Fills, in the same order they were applied.
    pub trades: Vec<Trade>,
}

/// Bar-driven matcher over a fixed set of grid levels.
pub struct OrderMatcher {
    levels: Vec<f64>,
    order_size: f64,
    next_order_id: u64,
}

impl OrderMatcher {
    /// Create a matcher. Levels are sorted ascending so touched levels are
    /// always processed in ascending price order.
    pub fn new(mut levels: Vec<f64>, order_size: f64) -> Self {
        levels.sort_by_key(|level| OrderedFloat(*level));
        Self {
            levels,
            order_size,
            next_order_id: 1,
        }
    }

    /// The grid this matcher trades against.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Process one bar: for each touched level decide intent, size the
    /// order at fixed notional, and request an immediate fill.
    ///
    /// Directional rule: `close <= level` means the price came down to the
    /// level, so the intent is buy; `close > level` means sell, but a sell
    /// with no position is skipped silently (no order is created).
    pub fn on_bar(&mut self, bar: &PriceBar, ledger: &mut PortfolioLedger) -> BarOutcome {
        let mut outcome = BarOutcome::default();

        for &level in &self.levels {
            let distance = (bar.close - level).abs() / level;
            if distance >= TOUCH_TOLERANCE {
                continue;
            }

            let side = if bar.close <= level {
                Side::Buy
            } else {
                Side::Sell
            };
            if side == Side::Sell && ledger.position() <= 0.0 {
                continue;
            }

            let mut order = Order {
                id: self.next_order_id,
                ts_ms: bar.ts_ms,
                price: level,
                amount: self.order_size / level,
                side,
                order_type: OrderType::Limit,
                status: OrderStatus::Open,
            };
            self.next_order_id += 1;

            match ledger.apply_fill(&order) {
                FillOutcome::Filled(trade) => {
                    order.status = OrderStatus::Filled;
                    outcome.trades.push(trade);
                }
                FillOutcome::Rejected => {
                    order.status = OrderStatus::Rejected;
                }
            }
            outcome.orders.push(order);
        }

        outcome
    }
}
