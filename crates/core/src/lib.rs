//! Core types and configuration for the grid-trader system.
//!
//! This crate provides shared types used across all other crates:
//! - Market data and portfolio types (bars, orders, trades, equity samples)
//! - Run configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{GridConfig, RunConfig};
pub use error::{Error, Result};
pub use types::*;
