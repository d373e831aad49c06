//! Tushare daily bar synchronization into ClickHouse.
//!
//! Per instrument, the pipeline is: API call, envelope decode, row transform,
//! one columnar bulk insert. Execution is strictly sequential with a fixed
//! pacing delay between API calls.

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
