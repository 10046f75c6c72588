//! Swap aggregator integration.
//!
//! The rest of the crate only talks to the aggregator through
//! [`SwapAggregator`], so the HTTP client can be swapped for a mock.

use crate::errors::Result;
use crate::models::{ExecutionReport, OrderParams, Quote, Token};
use async_trait::async_trait;

pub mod api_types;
pub mod client;

pub use client::AggregatorClient;

#[async_trait]
pub trait SwapAggregator: Send + Sync {
    /// Free-text token lookup (`GET /search`).
    async fn search(&self, query: &str) -> Result<Vec<Token>>;

    /// Price a swap and, when a taker is given, build its unsigned
    /// transaction (`GET /order`).
    async fn order(&self, params: &OrderParams) -> Result<Quote>;

    /// Submit a base64 signed transaction for settlement (`POST /execute`).
    async fn execute(&self, signed_transaction: &str, request_id: &str) -> Result<ExecutionReport>;
}
