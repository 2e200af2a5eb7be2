//! Core domain types and logic.

pub mod backtest;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod risk;
pub mod rolling;
pub mod strategy;
