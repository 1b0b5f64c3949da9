//! Core domain types and logic.

pub mod price;
pub mod indicator;
pub mod signal;
pub mod trade;
pub mod portfolio;
pub mod execution;
pub mod metrics;
pub mod backtest;
pub mod sweep;
pub mod config_validation;
pub mod error;
