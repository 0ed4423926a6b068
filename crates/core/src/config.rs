//! Configuration structures for the grid-trader system.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{GridType, RunMode};

/// Grid layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Spacing mode.
    pub grid_type: GridType,
    /// Number of price levels (at least 2).
    pub num_grids: u32,
    /// Half-width of the grid around the first close, as a fraction
    /// (0.10 = bounds at close * (1 -/+ 0.10)).
    pub grid_range_pct: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_type: GridType::Linear,
            num_grids: 20,
            grid_range_pct: 0.10,
        }
    }
}

impl GridConfig {
    /// Validate grid parameters. Fails fast, before any bar is processed.
    pub fn validate(&self) -> Result<()> {
        if self.num_grids < 2 {
            return Err(Error::config(format!(
                "num_grids must be at least 2, got {}",
                self.num_grids
            )));
        }
        if !self.grid_range_pct.is_finite() || self.grid_range_pct <= 0.0 {
            return Err(Error::config(format!(
                "grid_range_pct must be positive, got {}",
                self.grid_range_pct
            )));
        }
        if self.grid_range_pct >= 1.0 {
            // Lower bound would be non-positive, breaking relative-distance
            // touch detection and geometric spacing.
            return Err(Error::config(format!(
                "grid_range_pct must be below 1.0, got {}",
                self.grid_range_pct
            )));
        }
        Ok(())
    }
}

/// Full configuration for one simulation or backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Trading symbol (e.g., "BTC/USDT"). Informational; travels with the
    /// report and emitted events.
    pub symbol: String,
    /// Simulation (synthetic data) or backtest (historical data).
    pub mode: RunMode,
    /// Grid layout.
    pub grid: GridConfig,
    /// Fixed notional per grid order, in quote currency.
    pub order_size: f64,
    /// Fee rate applied symmetrically to both sides (0.001 = 0.1%).
    pub fee_rate: f64,
    /// Starting cash in quote currency.
    pub initial_capital: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC/USDT".to_string(),
            mode: RunMode::Simulation,
            grid: GridConfig::default(),
            order_size: 100.0,
            fee_rate: 0.001,
            initial_capital: 10_000.0,
        }
    }
}

impl RunConfig {
    /// Validate the whole run configuration.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        if !self.order_size.is_finite() || self.order_size <= 0.0 {
            return Err(Error::config(format!(
                "order_size must be positive, got {}",
                self.order_size
            )));
        }
        if !self.fee_rate.is_finite() || self.fee_rate < 0.0 {
            return Err(Error::config(format!(
                "fee_rate must be non-negative, got {}",
                self.fee_rate
            )));
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(Error::config(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.num_grids, 20);
        assert_eq!(config.fee_rate, 0.001);
        assert_eq!(config.initial_capital, 10_000.0);
    }

    #[test]
    fn test_rejects_single_level_grid() {
        let config = RunConfig {
            grid: GridConfig {
                num_grids: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_numeric_params() {
        let mut config = RunConfig {
            order_size: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.order_size = 100.0;
        config.fee_rate = -0.001;
        assert!(config.validate().is_err());

        config.fee_rate = 0.001;
        config.grid.grid_range_pct = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = RunConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.symbol, config.symbol);
        assert_eq!(back.grid.num_grids, config.grid.num_grids);
    }
}
