//! Portfolio ledger.
//!
//! Owns cash and position balances for one run and applies fills
//! atomically: a fill either updates both balances or leaves the ledger
//! untouched. Solvency is enforced here — cash and position never go
//! negative.

use grid_core::{Order, Portfolio, Side, Trade};

/// Outcome of requesting a fill against the ledger.
#[derive(Debug, Clone)]
pub enum FillOutcome {
    /// The order filled in full; the trade is ready for the history log.
    Filled(Trade),
    /// Insufficient cash (buy) or position (sell). Not fatal; the run
    /// continues and the order is recorded as rejected.
    Rejected,
}

/// Cash and position accounting for a single run.
pub struct PortfolioLedger {
    cash: f64,
    position: f64,
    fee_rate: f64,
    /// Sum of prior buy fill prices, for the running average buy price.
    buy_price_sum: f64,
    buy_count: u32,
}

impl PortfolioLedger {
    /// Create a ledger with starting cash and a symmetric fee rate.
    pub fn new(initial_cash: f64, fee_rate: f64) -> Self {
        Self {
            cash: initial_cash,
            position: 0.0,
            fee_rate,
            buy_price_sum: 0.0,
            buy_count: 0,
        }
    }

    /// Cash balance in quote currency.
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Position in base currency.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Running average buy price: the unweighted arithmetic mean of all
    /// buy fill prices so far. Deliberately not volume-weighted — realized
    /// profit parity with the reference behavior depends on it.
    pub fn average_buy_price(&self) -> Option<f64> {
        (self.buy_count > 0).then(|| self.buy_price_sum / self.buy_count as f64)
    }

    /// Apply a fill. Buys pay `price * amount * (1 + fee_rate)` from cash;
    /// sells return `price * amount * (1 - fee_rate)` and realize profit
    /// against the running average buy price.
    pub fn apply_fill(&mut self, order: &Order) -> FillOutcome {
        let notional = order.price * order.amount;
        let fee = notional * self.fee_rate;

        match order.side {
            Side::Buy => {
                let cost = notional + fee;
                if self.cash < cost {
                    return FillOutcome::Rejected;
                }
                self.cash -= cost;
                self.position += order.amount;
                self.buy_price_sum += order.price;
                self.buy_count += 1;

                FillOutcome::Filled(Trade {
                    order_id: order.id,
                    ts_ms: order.ts_ms,
                    price: order.price,
                    amount: order.amount,
                    side: Side::Buy,
                    fee,
                    realized_profit: None,
                })
            }
            Side::Sell => {
                if self.position < order.amount {
                    return FillOutcome::Rejected;
                }
                self.cash += notional - fee;
                self.position -= order.amount;

                // With no prior buys the average defaults to the sell
                // price, realizing zero profit.
                let avg_buy = self.average_buy_price().unwrap_or(order.price);
                let profit = (order.price - avg_buy) * order.amount;

                FillOutcome::Filled(Trade {
                    order_id: order.id,
                    ts_ms: order.ts_ms,
                    price: order.price,
                    amount: order.amount,
                    side: Side::Sell,
                    fee,
                    realized_profit: Some(profit),
                })
            }
        }
    }

    /// Value the portfolio at a mark price. Pure snapshot, no mutation.
    pub fn mark_to_market(&self, price: f64) -> Portfolio {
        Portfolio {
            cash: self.cash,
            position: self.position,
            total_value: self.cash + self.position * price,
        }
    }
}
