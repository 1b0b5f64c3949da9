//! smacross: SMA crossover strategy backtester.
//!
//! Hexagonal architecture: the signal/simulation/metrics engine in [`domain`],
//! port traits in [`ports`], concrete implementations in [`adapters`], and the
//! command-line host in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
