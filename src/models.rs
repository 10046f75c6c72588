//! Shared data structures used throughout the application.

use crate::amount;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// A token as listed by the aggregator's search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Mint address.
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub usd_price: Option<f64>,
    pub is_verified: bool,
    pub icon: Option<String>,
    pub tags: Vec<String>,
}

impl Token {
    /// Rough USD value of a human amount of this token, for display only.
    pub fn usd_value(&self, amount: &str) -> f64 {
        let Some(price) = self.usd_price else {
            return 0.0;
        };
        let Ok(value) = amount::parse_amount(amount) else {
            return 0.0;
        };
        value.to_f64().unwrap_or(0.0) * price
    }
}

/// Priced swap proposal returned by the order endpoint.
///
/// Amounts are integer base units of their respective tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: BigUint,
    pub out_amount: BigUint,
    /// Minimum received after slippage.
    pub other_amount_threshold: BigUint,
    pub slippage_bps: u16,
    pub price_impact_pct: f64,
    pub fee_bps: u32,
    pub platform_fee_bps: Option<u32>,
    pub signature_fee_lamports: u64,
    pub route_hops: usize,
    pub in_usd_value: Option<f64>,
    pub out_usd_value: Option<f64>,
    /// Correlates a later `/execute` call with this order.
    pub request_id: String,
    /// Base64 unsigned transaction; absent when no taker was given or the
    /// taker cannot fill the order.
    pub transaction: Option<String>,
    /// Advisory from the aggregator (e.g. insufficient balance).
    pub error_message: Option<String>,
}

/// Parameters of a `/order` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParams {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: BigUint,
    pub slippage_bps: Option<u16>,
    pub taker: Option<String>,
}

/// Settlement status reported by `/execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapStatus {
    Success,
    Failed,
    /// Any status string the aggregator returns that is not one of the above.
    Other(String),
}

impl SwapStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Success" => Self::Success,
            "Failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome of submitting a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub status: SwapStatus,
    pub signature: Option<String>,
    pub code: Option<i64>,
    pub error: Option<String>,
}
