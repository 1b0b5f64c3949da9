//! Technical indicator implementations.

pub mod sma;

pub use sma::calculate_sma;
