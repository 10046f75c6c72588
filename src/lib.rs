//! Core library for the swap-desk project.
//!
//! Token search, quote polling and swap execution against the Jupiter Ultra
//! API. The binary (`main.rs`) wires these into a small CLI.

pub mod aggregator;
pub mod amount;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod quote;
pub mod search;
pub mod showcase;
pub mod swap;
pub mod utils;
pub mod wallet;

#[cfg(test)]
mod testing;
