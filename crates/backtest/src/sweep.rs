//! Parameter sweep.
//!
//! Runs the cartesian product of candidate grid parameters over the same
//! data, one independent runner per combination. Runs share no mutable
//! state, so they parallelize over a small worker pool without locks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use grid_core::{GridType, MetricsReport, Result, RunConfig};
use grid_data::BarSource;
use serde::Serialize;

use crate::event::NullSink;
use crate::runner::BacktestRunner;

/// Candidate values per parameter. An empty dimension keeps the base
/// config's value.
#[derive(Debug, Clone, Default)]
pub struct SweepGrid {
    pub num_grids: Vec<u32>,
    pub grid_range_pct: Vec<f64>,
    pub grid_types: Vec<GridType>,
    pub order_sizes: Vec<f64>,
}

/// One evaluated parameter combination.
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub config: RunConfig,
    pub metrics: MetricsReport,
}

/// Expand the sweep grid into concrete run configurations.
pub fn expand_configs(base: &RunConfig, sweep: &SweepGrid) -> Vec<RunConfig> {
    let or_base = |values: &[f64], base: f64| -> Vec<f64> {
        if values.is_empty() {
            vec![base]
        } else {
            values.to_vec()
        }
    };

    let num_grids = if sweep.num_grids.is_empty() {
        vec![base.grid.num_grids]
    } else {
        sweep.num_grids.clone()
    };
    let ranges = or_base(&sweep.grid_range_pct, base.grid.grid_range_pct);
    let grid_types = if sweep.grid_types.is_empty() {
        vec![base.grid.grid_type]
    } else {
        sweep.grid_types.clone()
    };
    let order_sizes = or_base(&sweep.order_sizes, base.order_size);

    let mut configs = Vec::new();
    for &grid_type in &grid_types {
        for &num in &num_grids {
            for &range in &ranges {
                for &size in &order_sizes {
                    let mut config = base.clone();
                    config.grid.grid_type = grid_type;
                    config.grid.num_grids = num;
                    config.grid.grid_range_pct = range;
                    config.order_size = size;
                    configs.push(config);
                }
            }
        }
    }
    configs
}

/// Evaluate every combination and return outcomes sorted by Sharpe ratio,
/// best first.
///
/// `source_factory` builds a fresh source per run (each run replays the
/// data from the start). `workers = 0` uses the available parallelism.
/// Any configuration error fails the whole sweep before threads start;
/// a run failure fails the sweep after in-flight runs finish.
pub fn run_sweep<S, F>(
    base: &RunConfig,
    sweep: &SweepGrid,
    source_factory: F,
    workers: usize,
) -> Result<Vec<SweepOutcome>>
where
    S: BarSource,
    F: Fn() -> S + Sync,
{
    let configs = expand_configs(base, sweep);
    for config in &configs {
        config.validate()?;
    }

    let workers = effective_workers(workers, configs.len());
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<SweepOutcome>>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let configs = &configs;
            let source_factory = &source_factory;

            scope.spawn(move || loop {
                let i = next.fetch_add(1, Ordering::SeqCst);
                let Some(config) = configs.get(i) else {
                    break;
                };

                let outcome: Result<SweepOutcome> = (|| {
                    let mut source = source_factory();
                    let mut runner =
                        BacktestRunner::new(config.clone())?.with_sink(Box::new(NullSink));
                    let report = runner.run(&mut source)?;
                    Ok(SweepOutcome {
                        config: config.clone(),
                        metrics: report.metrics,
                    })
                })();

                if tx.send(outcome).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    let mut outcomes = Vec::with_capacity(configs.len());
    for result in rx {
        outcomes.push(result?);
    }
    outcomes.sort_by(|a, b| {
        b.metrics
            .sharpe_ratio
            .total_cmp(&a.metrics.sharpe_ratio)
    });
    Ok(outcomes)
}

fn effective_workers(requested: usize, jobs: usize) -> usize {
    let auto = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let workers = if requested == 0 { auto } else { requested };
    workers.clamp(1, jobs.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_data::{RandomWalkConfig, RandomWalkSource};

    fn base() -> RunConfig {
        RunConfig::default()
    }

    fn make_source() -> RandomWalkSource {
        RandomWalkSource::new(RandomWalkConfig {
            bars: 1_000,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_expand_cartesian_product() {
        let sweep = SweepGrid {
            num_grids: vec![10, 20],
            grid_range_pct: vec![0.05, 0.10, 0.15],
            grid_types: vec![GridType::Linear, GridType::Geometric],
            order_sizes: vec![],
        };
        let configs = expand_configs(&base(), &sweep);
        assert_eq!(configs.len(), 2 * 3 * 2);
        // Empty dimension keeps the base order size.
        assert!(configs.iter().all(|c| c.order_size == base().order_size));
    }

    #[test]
    fn test_empty_sweep_is_just_the_base() {
        let configs = expand_configs(&base(), &SweepGrid::default());
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].grid.num_grids, base().grid.num_grids);
    }

    #[test]
    fn test_sweep_runs_all_combinations_sorted() {
        let sweep = SweepGrid {
            num_grids: vec![5, 10],
            grid_range_pct: vec![0.05, 0.10],
            ..Default::default()
        };

        let outcomes = run_sweep(&base(), &sweep, make_source, 2).unwrap();
        assert_eq!(outcomes.len(), 4);
        for pair in outcomes.windows(2) {
            assert!(pair[0].metrics.sharpe_ratio >= pair[1].metrics.sharpe_ratio);
        }
    }

    #[test]
    fn test_sweep_fails_fast_on_invalid_combination() {
        let sweep = SweepGrid {
            num_grids: vec![5, 1], // 1 is invalid
            ..Default::default()
        };
        assert!(run_sweep(&base(), &sweep, make_source, 1).is_err());
    }

    #[test]
    fn test_sweep_is_deterministic() {
        let sweep = SweepGrid {
            num_grids: vec![5, 10],
            ..Default::default()
        };

        let mut a = run_sweep(&base(), &sweep, make_source, 2).unwrap();
        let mut b = run_sweep(&base(), &sweep, make_source, 1).unwrap();

        // Compare per combination; completion order varies with workers.
        a.sort_by_key(|o| o.config.grid.num_grids);
        b.sort_by_key(|o| o.config.grid.num_grids);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.config.grid.num_grids, y.config.grid.num_grids);
            assert_eq!(x.metrics, y.metrics);
        }
    }
}
