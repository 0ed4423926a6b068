//! Performance metrics.
//!
//! A pure function over (equity curve, trade list). Nothing here holds
//! state, so calling it twice on the same inputs always yields identical
//! output.

use grid_core::{EquitySample, MetricsReport, Trade};
use statrs::statistics::Statistics;

/// Compute the metrics report for a completed run.
///
/// `periods_per_year` matches the bar sampling frequency (365 * 24 for
/// hourly bars) and only affects the Sharpe annualization. Degenerate
/// inputs (no trades, fewer than two equity samples) produce a zeroed
/// report, never an error.
pub fn compute_metrics(
    equity: &[EquitySample],
    trades: &[Trade],
    periods_per_year: f64,
) -> MetricsReport {
    let mut report = MetricsReport {
        total_trades: trades.len() as u32,
        ..Default::default()
    };

    // Trade statistics over trades with a defined realized profit (sells).
    let realized: Vec<f64> = trades
        .iter()
        .filter_map(|t| t.realized_profit)
        .filter(|p| p.is_finite())
        .collect();

    if !realized.is_empty() {
        let wins = realized.iter().filter(|p| **p > 0.0).count();
        report.win_rate_pct = wins as f64 / realized.len() as f64 * 100.0;
        report.avg_trade = realized.iter().sum::<f64>() / realized.len() as f64;

        let gross_profit: f64 = realized.iter().filter(|p| **p > 0.0).sum();
        let gross_loss: f64 = realized.iter().filter(|p| **p < 0.0).sum::<f64>().abs();
        report.profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
    }

    if equity.len() < 2 {
        return report;
    }

    let first = equity[0].value;
    let last = equity[equity.len() - 1].value;
    if first != 0.0 {
        report.total_return_pct = (last / first - 1.0) * 100.0;
    }

    // Bar-over-bar percentage returns, non-finite entries dropped.
    let returns: Vec<f64> = equity
        .windows(2)
        .filter(|w| w[0].value != 0.0)
        .map(|w| (w[1].value - w[0].value) / w[0].value)
        .filter(|r| r.is_finite())
        .collect();

    if returns.len() >= 2 {
        let mean = returns.iter().mean();
        let std_dev = returns.iter().std_dev();
        if std_dev > 0.0 {
            report.sharpe_ratio = mean / std_dev * periods_per_year.sqrt();
        }
    }

    let mut peak = f64::MIN;
    let mut max_drawdown_pct = 0.0_f64;
    for sample in equity {
        peak = peak.max(sample.value);
        if peak > 0.0 {
            let drawdown = (sample.value - peak) / peak * 100.0;
            max_drawdown_pct = max_drawdown_pct.min(drawdown);
        }
    }
    report.max_drawdown_pct = max_drawdown_pct;

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use grid_core::Side;

    const HOURLY: f64 = 365.0 * 24.0;

    fn curve(values: &[f64]) -> Vec<EquitySample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| EquitySample {
                ts_ms: i as i64 * 3_600_000,
                value: *v,
                price: 100.0,
            })
            .collect()
    }

    fn sell(profit: f64) -> Trade {
        Trade {
            order_id: 1,
            ts_ms: 1000,
            price: 100.0,
            amount: 1.0,
            side: Side::Sell,
            fee: 0.1,
            realized_profit: Some(profit),
        }
    }

    fn buy() -> Trade {
        Trade {
            order_id: 1,
            ts_ms: 1000,
            price: 100.0,
            amount: 1.0,
            side: Side::Buy,
            fee: 0.1,
            realized_profit: None,
        }
    }

    #[test]
    fn test_no_trades_no_curve_is_all_zero() {
        let report = compute_metrics(&[], &[], HOURLY);
        assert_eq!(report, MetricsReport::default());
        assert_eq!(report.profit_factor, 0.0);
        assert_eq!(report.win_rate_pct, 0.0);
    }

    #[test]
    fn test_total_return() {
        let report = compute_metrics(&curve(&[10_000.0, 11_000.0]), &[], HOURLY);
        assert_relative_eq!(report.total_return_pct, 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_max_drawdown_example() {
        // Worked example: peak 10500, trough 9800 -> -6.666...%
        let report = compute_metrics(&curve(&[10_000.0, 10_500.0, 9_800.0, 11_000.0]), &[], HOURLY);
        assert_relative_eq!(
            report.max_drawdown_pct,
            (9_800.0 - 10_500.0) / 10_500.0 * 100.0,
            max_relative = 1e-12
        );
        assert!(report.max_drawdown_pct < 0.0);
    }

    #[test]
    fn test_drawdown_never_positive() {
        let report = compute_metrics(&curve(&[100.0, 110.0, 120.0]), &[], HOURLY);
        assert_eq!(report.max_drawdown_pct, 0.0);
    }

    #[test]
    fn test_win_rate_counts_only_defined_profits() {
        // Two sells (one win, one loss) and a buy with no defined profit.
        let trades = vec![sell(10.0), sell(-5.0), buy()];
        let report = compute_metrics(&[], &trades, HOURLY);

        assert_eq!(report.total_trades, 3);
        assert_relative_eq!(report.win_rate_pct, 50.0, max_relative = 1e-12);
        assert_relative_eq!(report.profit_factor, 2.0, max_relative = 1e-12);
        assert_relative_eq!(report.avg_trade, 2.5, max_relative = 1e-12);
    }

    #[test]
    fn test_profit_factor_infinite_without_losses() {
        let report = compute_metrics(&[], &[sell(10.0), sell(5.0)], HOURLY);
        assert!(report.profit_factor.is_infinite());
        assert_eq!(report.win_rate_pct, 100.0);
    }

    #[test]
    fn test_sharpe_zero_on_flat_curve() {
        let report = compute_metrics(&curve(&[100.0, 100.0, 100.0, 100.0]), &[], HOURLY);
        assert_eq!(report.sharpe_ratio, 0.0);
    }

    #[test]
    fn test_sharpe_positive_on_rising_noisy_curve() {
        let report = compute_metrics(
            &curve(&[100.0, 102.0, 101.0, 104.0, 103.0, 107.0]),
            &[],
            HOURLY,
        );
        assert!(report.sharpe_ratio > 0.0);
    }

    #[test]
    fn test_idempotent() {
        let equity = curve(&[10_000.0, 10_300.0, 10_100.0, 10_600.0]);
        let trades = vec![sell(30.0), sell(-10.0)];

        let a = compute_metrics(&equity, &trades, HOURLY);
        let b = compute_metrics(&equity, &trades, HOURLY);
        assert_eq!(a, b);
    }
}
