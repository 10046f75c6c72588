//! Quote polling.
//!
//! A [`QuotePoller`] owns one background task. It fetches a quote as soon as
//! the request changes and again on every refresh tick. Each published state
//! is tagged with the [`QuoteKey`] it was computed for so a consumer can
//! refuse results that no longer match its inputs.

use crate::aggregator::SwapAggregator;
use crate::amount;
use crate::models::{OrderParams, Quote, Token};
use num_bigint::BigUint;
use num_traits::Zero;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The input tuple a quote is valid for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: BigUint,
    pub slippage_bps: u16,
    pub taker: Option<String>,
}

/// Everything needed to ask for a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub input: Token,
    pub output: Token,
    /// Input amount in base units; always positive.
    pub amount: BigUint,
    pub slippage_bps: u16,
    pub taker: Option<String>,
}

impl QuoteRequest {
    /// `None` unless the request is worth sending (distinct tokens, amount > 0).
    pub fn new(
        input: Token,
        output: Token,
        amount: BigUint,
        slippage_bps: u16,
        taker: Option<String>,
    ) -> Option<Self> {
        if amount.is_zero() || input.id == output.id {
            return None;
        }
        Some(Self {
            input,
            output,
            amount,
            slippage_bps,
            taker,
        })
    }

    pub fn key(&self) -> QuoteKey {
        QuoteKey {
            input_mint: self.input.id.clone(),
            output_mint: self.output.id.clone(),
            amount: self.amount.clone(),
            slippage_bps: self.slippage_bps,
            taker: self.taker.clone(),
        }
    }

    pub fn order_params(&self) -> OrderParams {
        OrderParams {
            input_mint: self.input.id.clone(),
            output_mint: self.output.id.clone(),
            amount: self.amount.clone(),
            slippage_bps: Some(self.slippage_bps),
            taker: self.taker.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum QuoteState {
    /// Polling disabled.
    #[default]
    Idle,
    Loading {
        key: QuoteKey,
    },
    Ready {
        key: QuoteKey,
        quote: Arc<Quote>,
    },
    Failed {
        key: QuoteKey,
        reason: String,
    },
}

impl QuoteState {
    pub fn key(&self) -> Option<&QuoteKey> {
        match self {
            Self::Idle => None,
            Self::Loading { key } | Self::Ready { key, .. } | Self::Failed { key, .. } => {
                Some(key)
            }
        }
    }
}

/// Handle to the polling task. Dropping it stops polling.
pub struct QuotePoller {
    request_tx: watch::Sender<Option<QuoteRequest>>,
    state_rx: watch::Receiver<QuoteState>,
    handle: JoinHandle<()>,
}

impl QuotePoller {
    pub fn spawn(aggregator: Arc<dyn SwapAggregator>, refresh: Duration) -> Self {
        let (request_tx, request_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(QuoteState::Idle);
        let handle = tokio::spawn(run_quote_loop(aggregator, refresh, request_rx, state_tx));
        Self {
            request_tx,
            state_rx,
            handle,
        }
    }

    /// Replace the inputs. `None` disables polling. Setting an identical
    /// request does not trigger a refetch.
    pub fn set_request(&self, request: Option<QuoteRequest>) {
        self.request_tx.send_if_modified(|current| {
            if *current == request {
                return false;
            }
            *current = request;
            true
        });
    }

    pub fn state(&self) -> QuoteState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuoteState> {
        self.state_rx.clone()
    }

    pub fn stop(self) {}
}

impl Drop for QuotePoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_quote_loop(
    aggregator: Arc<dyn SwapAggregator>,
    refresh: Duration,
    mut request_rx: watch::Receiver<Option<QuoteRequest>>,
    state_tx: watch::Sender<QuoteState>,
) {
    loop {
        let current = request_rx.borrow_and_update().clone();
        let Some(request) = current else {
            state_tx.send_replace(QuoteState::Idle);
            if request_rx.changed().await.is_err() {
                return;
            }
            continue;
        };

        let key = request.key();
        let params = request.order_params();
        state_tx.send_replace(QuoteState::Loading { key: key.clone() });
        debug!(?key, "[QUOTE] fetching");

        // A newer request drops the in-flight one
        let result = tokio::select! {
            res = aggregator.order(&params) => res,
            changed = request_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                debug!("[QUOTE] inputs changed mid-flight, refetching");
                continue;
            }
        };

        if request_rx.has_changed().unwrap_or(false) {
            continue;
        }

        let next = match result {
            Ok(quote) => {
                info!(
                    out_amount = %quote.out_amount,
                    price_impact_pct = quote.price_impact_pct,
                    "[QUOTE] updated"
                );
                QuoteState::Ready {
                    key,
                    quote: Arc::new(quote),
                }
            }
            Err(e) => {
                warn!(error = %e, "[QUOTE] fetch failed");
                QuoteState::Failed {
                    key,
                    reason: e.reason(),
                }
            }
        };
        state_tx.send_replace(next);

        tokio::select! {
            _ = tokio::time::sleep(refresh) => {}
            changed = request_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

/// How worrying a price impact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactLevel {
    Low,
    Elevated,
    High,
}

impl ImpactLevel {
    pub fn from_pct(pct: f64) -> Self {
        let pct = pct.abs();
        if pct > 5.0 {
            Self::High
        } else if pct > 1.0 {
            Self::Elevated
        } else {
            Self::Low
        }
    }
}

/// Display-ready figures derived from a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSummary {
    /// Input USD value over output USD value.
    pub rate: Option<f64>,
    pub price_impact_pct: f64,
    pub impact: ImpactLevel,
    /// Minimum received, in output token units.
    pub minimum_received: String,
    pub platform_fee_pct: f64,
    pub network_fee_sol: f64,
    pub route_hops: usize,
}

const LAMPORTS_PER_SOL: f64 = 1e9;

impl QuoteSummary {
    pub fn new(quote: &Quote, output_decimals: u8) -> Self {
        let rate = match (quote.in_usd_value, quote.out_usd_value) {
            (Some(i), Some(o)) if o > 0.0 => Some(i / o),
            _ => None,
        };
        Self {
            rate,
            price_impact_pct: quote.price_impact_pct.abs(),
            impact: ImpactLevel::from_pct(quote.price_impact_pct),
            minimum_received: amount::from_base_units(
                &quote.other_amount_threshold,
                output_decimals,
            ),
            platform_fee_pct: quote.platform_fee_bps.map_or(0.0, |bps| bps as f64 / 100.0),
            network_fee_sol: quote.signature_fee_lamports as f64 / LAMPORTS_PER_SOL,
            route_hops: quote.route_hops,
        }
    }
}

/// `1.2M`, `3.4K`, or four decimals below a thousand.
pub fn format_compact(num: f64) -> String {
    if num >= 1_000_000.0 {
        format!("{:.1}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.1}K", num / 1_000.0)
    } else {
        format!("{num:.4}")
    }
}
