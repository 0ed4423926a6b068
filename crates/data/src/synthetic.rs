//! Synthetic market data generation.
//!
//! Produces a seeded geometric random walk with a soft mean-reversion
//! clamp, so simulated prices stay in the neighborhood of the configured
//! base price and the grid remains relevant over long runs.

use grid_core::{Error, PriceBar, Result, TimestampMs};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::BarSource;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Configuration for the synthetic random walk.
#[derive(Debug, Clone)]
pub struct RandomWalkConfig {
    /// Anchor price the walk reverts toward.
    pub base_price: f64,
    /// Daily volatility of log returns, scaled per bar by sqrt(bars/day).
    pub daily_volatility: f64,
    /// Per-bar drift of log returns.
    pub drift: f64,
    /// Number of bars to produce.
    pub bars: usize,
    /// Bar interval in milliseconds.
    pub interval_ms: i64,
    /// Timestamp of the first bar. Fixed by default so seeded runs are
    /// fully reproducible, timestamps included.
    pub start_ts_ms: TimestampMs,
    /// RNG seed; the same seed yields an identical bar sequence.
    pub seed: u64,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            base_price: 50_000.0,
            daily_volatility: 0.02,
            drift: 0.0,
            bars: 30 * 24 * 60,
            interval_ms: 60_000,
            start_ts_ms: 1_700_000_000_000,
            seed: 42,
        }
    }
}

impl RandomWalkConfig {
    fn validate(&self) -> Result<()> {
        if !self.base_price.is_finite() || self.base_price <= 0.0 {
            return Err(Error::config(format!(
                "base_price must be positive, got {}",
                self.base_price
            )));
        }
        if !self.daily_volatility.is_finite() || self.daily_volatility < 0.0 {
            return Err(Error::config(format!(
                "daily_volatility must be non-negative, got {}",
                self.daily_volatility
            )));
        }
        if self.interval_ms <= 0 {
            return Err(Error::config(format!(
                "interval_ms must be positive, got {}",
                self.interval_ms
            )));
        }
        Ok(())
    }
}

/// Seeded geometric random walk bar source.
///
/// Each step multiplies the price by `exp(r)` with `r ~ N(drift, sigma)`.
/// If a step would carry the price beyond +/-10% of the base price, the
/// step is replaced by a 0.1% move back toward the base from the previous
/// price (soft mean reversion).
pub struct RandomWalkSource {
    config: RandomWalkConfig,
    return_dist: Normal<f64>,
    volume_dist: Uniform<f64>,
    rng: StdRng,
    price: f64,
    index: usize,
}

impl RandomWalkSource {
    /// Create a new source. Fails on invalid volatility, base price or
    /// interval.
    pub fn new(config: RandomWalkConfig) -> Result<Self> {
        config.validate()?;

        let steps_per_day = MS_PER_DAY / config.interval_ms as f64;
        let sigma = config.daily_volatility / steps_per_day.sqrt();
        let return_dist = Normal::new(config.drift, sigma)
            .map_err(|e| Error::config(format!("invalid return distribution: {e}")))?;

        Ok(Self {
            return_dist,
            volume_dist: Uniform::new(100.0, 1000.0),
            rng: StdRng::seed_from_u64(config.seed),
            price: config.base_price,
            index: 0,
            config,
        })
    }

    /// Advance the walk one step and return the new close price.
    fn step(&mut self) -> f64 {
        let ret = self.return_dist.sample(&mut self.rng);
        let candidate = self.price * ret.exp();

        if candidate > self.config.base_price * 1.1 {
            self.price * 0.999
        } else if candidate < self.config.base_price * 0.9 {
            self.price * 1.001
        } else {
            candidate
        }
    }
}

impl BarSource for RandomWalkSource {
    fn next_bar(&mut self) -> Option<PriceBar> {
        if self.index >= self.config.bars {
            return None;
        }

        let close = self.step();
        self.price = close;

        let ts_ms = self.config.start_ts_ms + self.index as i64 * self.config.interval_ms;
        self.index += 1;

        Some(PriceBar {
            ts_ms,
            open: close * 0.999,
            high: close * 1.001,
            low: close * 0.998,
            close,
            volume: self.volume_dist.sample(&mut self.rng),
        })
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.price = self.config.base_price;
        self.index = 0;
    }
}
