//! Mock collaborators shared by the in-crate test suites.

use crate::aggregator::SwapAggregator;
use crate::errors::{AppError, Result};
use crate::models::{ExecutionReport, OrderParams, Quote, SwapStatus, Token};
use crate::wallet::WalletSession;
use async_trait::async_trait;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const TAKER: &str = "TakerWa11et1111111111111111111111111111111";

pub fn sol() -> Token {
    Token {
        id: SOL_MINT.into(),
        symbol: "SOL".into(),
        name: "Wrapped SOL".into(),
        decimals: 9,
        usd_price: Some(190.0),
        is_verified: true,
        icon: None,
        tags: vec![],
    }
}

pub fn usdc() -> Token {
    Token {
        id: USDC_MINT.into(),
        symbol: "USDC".into(),
        name: "USD Coin".into(),
        decimals: 6,
        usd_price: Some(1.0),
        is_verified: true,
        icon: None,
        tags: vec![],
    }
}

/// A quote that prices one input base unit at `rate` output base units.
pub fn quote_for(params: &OrderParams, rate: u64) -> Quote {
    let out = &params.amount * BigUint::from(rate);
    Quote {
        input_mint: params.input_mint.clone(),
        output_mint: params.output_mint.clone(),
        in_amount: params.amount.clone(),
        out_amount: out.clone(),
        other_amount_threshold: out,
        slippage_bps: params.slippage_bps.unwrap_or(50),
        price_impact_pct: 0.1,
        fee_bps: 5,
        platform_fee_bps: Some(5),
        signature_fee_lamports: 5000,
        route_hops: 1,
        in_usd_value: Some(190.0),
        out_usd_value: Some(189.5),
        request_id: "req-1".into(),
        transaction: params.taker.as_ref().map(|_| "AQID".into()),
        error_message: None,
    }
}

/// Scripted aggregator that records every call.
#[derive(Default)]
pub struct MockAggregator {
    pub tokens: Vec<Token>,
    pub search_calls: Mutex<Vec<String>>,
    pub order_calls: Mutex<Vec<OrderParams>>,
    pub execute_calls: Mutex<Vec<(String, String)>>,
    /// Per-amount artificial latency of `order`.
    pub order_delays: HashMap<BigUint, Duration>,
    pub order_error: Option<AppError>,
    pub omit_transaction: bool,
    pub search_error: Option<AppError>,
    /// Per-query artificial latency of `search`.
    pub search_delays: HashMap<String, Duration>,
    pub execute_status: Option<&'static str>,
    pub execute_error: Option<AppError>,
}

impl MockAggregator {
    pub fn search_count(&self) -> usize {
        self.search_calls.lock().unwrap().len()
    }

    pub fn order_count(&self) -> usize {
        self.order_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SwapAggregator for MockAggregator {
    async fn search(&self, query: &str) -> Result<Vec<Token>> {
        self.search_calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(e) = &self.search_error {
            return Err(e.clone());
        }
        let needle = query.to_lowercase();
        Ok(self
            .tokens
            .iter()
            .filter(|t| t.symbol.to_lowercase().contains(&needle) || t.id == query)
            .cloned()
            .collect())
    }

    async fn order(&self, params: &OrderParams) -> Result<Quote> {
        self.order_calls.lock().unwrap().push(params.clone());
        if let Some(delay) = self.order_delays.get(&params.amount) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(e) = &self.order_error {
            return Err(e.clone());
        }
        let mut quote = quote_for(params, 2);
        if self.omit_transaction {
            quote.transaction = None;
            quote.error_message = Some("Insufficient funds".into());
        }
        Ok(quote)
    }

    async fn execute(&self, signed_transaction: &str, request_id: &str) -> Result<ExecutionReport> {
        self.execute_calls
            .lock()
            .unwrap()
            .push((signed_transaction.to_string(), request_id.to_string()));
        if let Some(e) = &self.execute_error {
            return Err(e.clone());
        }
        Ok(ExecutionReport {
            status: SwapStatus::parse(self.execute_status.unwrap_or("Success")),
            signature: Some("5igNaTuRe".into()),
            code: Some(0),
            error: None,
        })
    }
}

/// Wallet that appends a marker byte as its "signature".
pub struct MockWallet {
    pub address: Mutex<Option<String>>,
    pub reject: bool,
    pub signed: Mutex<Vec<Vec<u8>>>,
}

impl MockWallet {
    pub fn connected() -> Self {
        Self {
            address: Mutex::new(Some(TAKER.into())),
            reject: false,
            signed: Mutex::new(vec![]),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            address: Mutex::new(None),
            reject: false,
            signed: Mutex::new(vec![]),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::connected()
        }
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    fn address(&self) -> Option<String> {
        self.address.lock().unwrap().clone()
    }

    async fn login(&self) -> Result<()> {
        *self.address.lock().unwrap() = Some(TAKER.into());
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        *self.address.lock().unwrap() = None;
        Ok(())
    }

    async fn sign_transaction(&self, transaction: &[u8]) -> Result<Vec<u8>> {
        if self.reject {
            return Err(AppError::wallet("User rejected the request"));
        }
        let mut signed = transaction.to_vec();
        signed.push(0xff);
        self.signed.lock().unwrap().push(signed.clone());
        Ok(signed)
    }
}
