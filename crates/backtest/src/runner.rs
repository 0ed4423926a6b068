//! Run orchestration.
//!
//! Drives the bar loop: computes the grid from the first bar, feeds each
//! bar through the matcher and ledger, accumulates the equity curve and
//! trade log, and produces the final report. A runner owns all of its run
//! state exclusively; concurrent backtests use independent runners.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use grid_core::{
    EquitySample, Error, MetricsReport, Order, Portfolio, PriceBar, Result, RunConfig, RunMode,
    Trade, MS_PER_YEAR,
};
use grid_data::BarSource;
use serde::{Deserialize, Serialize};

use crate::event::{EventSink, LogSink, RunEvent};
use crate::grid::generate_levels;
use crate::ledger::PortfolioLedger;
use crate::matcher::OrderMatcher;
use crate::metrics::compute_metrics;

/// Sharpe annualization when the bar interval cannot be observed
/// (hourly bars).
const DEFAULT_PERIODS_PER_YEAR: f64 = 365.0 * 24.0;

/// Runner lifecycle. A runner is single-use: once `Completed`, whether the
/// run finished or aborted, it cannot be run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

/// Everything a completed run produces. The field layout is the stable
/// contract consumed by the API/dashboard layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Symbol the run was configured for.
    pub symbol: String,
    /// Simulation or backtest.
    pub mode: RunMode,
    /// One sample per consumed bar, in bar order.
    pub equity_curve: Vec<EquitySample>,
    /// Executed fills, append-only history.
    pub trades: Vec<Trade>,
    /// Every order created, filled or rejected.
    pub orders: Vec<Order>,
    /// Final portfolio, marked at the last close.
    pub portfolio: Portfolio,
    /// Performance metrics over the equity curve and trades.
    pub metrics: MetricsReport,
}

/// Cooperative cancellation handle, checked once per bar.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Request cancellation. The run aborts before its next bar.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Single-run orchestrator for both simulation and backtest modes.
pub struct BacktestRunner {
    config: RunConfig,
    state: RunState,
    cancel: CancelToken,
    sink: Box<dyn EventSink + Send>,
}

impl BacktestRunner {
    /// Create a runner. The configuration is validated here, before any
    /// bar is processed.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: RunState::Idle,
            cancel: CancelToken::default(),
            sink: Box::new(LogSink),
        })
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: Box<dyn EventSink + Send>) -> Self {
        self.sink = sink;
        self
    }

    /// Handle for cancelling this run from another task.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Consume the data source to exhaustion and return the report.
    ///
    /// Grid levels are computed once, from the first bar's close, with
    /// bounds at `close * (1 -/+ grid_range_pct)`. A malformed bar or a
    /// cancellation aborts the run with an error; data exhaustion
    /// completes it normally.
    pub fn run<S: BarSource>(&mut self, source: &mut S) -> Result<RunReport> {
        if self.state != RunState::Idle {
            return Err(Error::config("runner already used; construct a new one"));
        }
        self.state = RunState::Running;

        let result = self.run_inner(source);
        self.state = RunState::Completed;
        result
    }

    fn run_inner<S: BarSource>(&mut self, source: &mut S) -> Result<RunReport> {
        self.sink.on_event(&RunEvent::Started {
            symbol: self.config.symbol.clone(),
            mode: self.config.mode,
        });

        let mut ledger = PortfolioLedger::new(self.config.initial_capital, self.config.fee_rate);

        let first_bar = match source.next_bar() {
            Some(bar) => bar,
            // An empty source is not an error; the run completes with an
            // empty history.
            None => return Ok(self.finish(Vec::new(), Vec::new(), Vec::new(), &ledger, None)),
        };
        validate_bar(&first_bar, None)?;

        let lower = first_bar.close * (1.0 - self.config.grid.grid_range_pct);
        let upper = first_bar.close * (1.0 + self.config.grid.grid_range_pct);
        let levels = generate_levels(
            lower,
            upper,
            self.config.grid.num_grids,
            self.config.grid.grid_type,
        )?;
        self.sink.on_event(&RunEvent::LevelsComputed {
            levels: levels.clone(),
        });
        let mut matcher = OrderMatcher::new(levels, self.config.order_size);

        let mut equity_curve = Vec::new();
        let mut trades = Vec::new();
        let mut orders = Vec::new();
        let mut last_bar = first_bar.clone();

        let mut bar = Some(first_bar);
        loop {
            let current = match bar.take() {
                Some(b) => b,
                None => break,
            };

            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            self.process_bar(&current, &mut matcher, &mut ledger, &mut orders, &mut trades);
            equity_curve.push(EquitySample {
                ts_ms: current.ts_ms,
                value: ledger.mark_to_market(current.close).total_value,
                price: current.close,
            });
            last_bar = current;

            bar = source.next_bar();
            if let Some(next) = &bar {
                validate_bar(next, Some(last_bar.ts_ms))?;
            }
        }

        Ok(self.finish(equity_curve, trades, orders, &ledger, Some(last_bar.close)))
    }

    fn process_bar(
        &mut self,
        bar: &PriceBar,
        matcher: &mut OrderMatcher,
        ledger: &mut PortfolioLedger,
        orders: &mut Vec<Order>,
        trades: &mut Vec<Trade>,
    ) {
        let outcome = matcher.on_bar(bar, ledger);
        for trade in &outcome.trades {
            self.sink.on_event(&RunEvent::OrderFilled {
                trade: trade.clone(),
            });
        }
        for order in &outcome.orders {
            if order.status == grid_core::OrderStatus::Rejected {
                self.sink.on_event(&RunEvent::OrderRejected {
                    order: order.clone(),
                });
            }
        }
        orders.extend(outcome.orders);
        trades.extend(outcome.trades);
    }

    fn finish(
        &mut self,
        equity_curve: Vec<EquitySample>,
        trades: Vec<Trade>,
        orders: Vec<Order>,
        ledger: &PortfolioLedger,
        last_close: Option<f64>,
    ) -> RunReport {
        let periods_per_year = annualization(&equity_curve);
        let metrics = compute_metrics(&equity_curve, &trades, periods_per_year);
        self.sink.on_event(&RunEvent::Completed {
            metrics: metrics.clone(),
        });

        RunReport {
            symbol: self.config.symbol.clone(),
            mode: self.config.mode,
            equity_curve,
            trades,
            orders,
            portfolio: ledger.mark_to_market(last_close.unwrap_or(0.0)),
            metrics,
        }
    }

    /// Run on a blocking task, returning the join handle and a
    /// cancellation token. This is the non-blocking start operation:
    /// the result flows only through the handle, and the token is the
    /// only channel back into the run.
    pub fn spawn<S>(
        config: RunConfig,
        mut source: S,
    ) -> Result<(
        tokio::task::JoinHandle<Result<RunReport>>,
        CancelToken,
    )>
    where
        S: BarSource + Send + 'static,
    {
        let mut runner = BacktestRunner::new(config)?;
        let token = runner.cancel_token();
        let handle = tokio::task::spawn_blocking(move || runner.run(&mut source));
        Ok((handle, token))
    }
}

/// Derive the Sharpe annualization factor from the observed bar interval.
fn annualization(equity: &[EquitySample]) -> f64 {
    match equity {
        [first, second, ..] => MS_PER_YEAR / (second.ts_ms - first.ts_ms) as f64,
        _ => DEFAULT_PERIODS_PER_YEAR,
    }
}

fn validate_bar(bar: &PriceBar, prev_ts: Option<i64>) -> Result<()> {
    if !bar.close.is_finite() || bar.close <= 0.0 {
        return Err(Error::data(format!(
            "bar at {} has invalid close {}",
            bar.ts_ms, bar.close
        )));
    }
    if let Some(prev) = prev_ts {
        if bar.ts_ms <= prev {
            return Err(Error::data(format!(
                "bar timestamp {} does not advance past {}",
                bar.ts_ms, prev
            )));
        }
    }
    Ok(())
}
