//! capleader — market-cap rotation strategy backtester.
//!
//! Simulates a "hold the largest-market-cap asset" strategy over a daily
//! price/market-cap series and compares its NAV curve against passive
//! buy-and-hold benchmarks. Hexagonal architecture: domain logic in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
