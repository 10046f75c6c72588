//! Swap form state: selected tokens, amount strings, slippage and the quote
//! currently shown for them.

use crate::amount;
use crate::errors::{AppError, Result};
use crate::models::{Quote, Token};
use crate::quote::{QuoteKey, QuoteRequest, QuoteState, QuoteSummary};
use num_bigint::BigUint;
use std::sync::Arc;

pub const MIN_SLIPPAGE_BPS: u16 = 10;
pub const MAX_SLIPPAGE_BPS: u16 = 5_000;

const ERR_SAME_TOKEN: &str = "Input and output tokens cannot be the same";

/// Which side of the form a token selection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

/// Result of a token selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Selected,
    /// The token was already on the other side, so the sides were swapped.
    Swapped,
}

/// Quote currently backing the output amount.
#[derive(Debug, Clone, PartialEq)]
enum QuoteView {
    None,
    Loading(QuoteKey),
    Ready(QuoteKey, Arc<Quote>),
    Failed(QuoteKey, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapForm {
    input_token: Option<Token>,
    output_token: Option<Token>,
    input_amount: String,
    output_amount: String,
    slippage_bps: u16,
    quote: QuoteView,
    executing: bool,
}

impl Default for SwapForm {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SLIPPAGE_BPS)
    }
}

impl SwapForm {
    pub fn new(slippage_bps: u16) -> Self {
        Self {
            input_token: None,
            output_token: None,
            input_amount: String::new(),
            output_amount: String::new(),
            slippage_bps: slippage_bps.clamp(MIN_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS),
            quote: QuoteView::None,
            executing: false,
        }
    }

    pub fn input_token(&self) -> Option<&Token> {
        self.input_token.as_ref()
    }

    pub fn output_token(&self) -> Option<&Token> {
        self.output_token.as_ref()
    }

    pub fn input_amount(&self) -> &str {
        &self.input_amount
    }

    pub fn output_amount(&self) -> &str {
        &self.output_amount
    }

    pub fn slippage_bps(&self) -> u16 {
        self.slippage_bps
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub(crate) fn set_executing(&mut self, executing: bool) {
        self.executing = executing;
    }

    /// The quote applied for the current inputs, if any.
    pub fn quote(&self) -> Option<&Arc<Quote>> {
        match &self.quote {
            QuoteView::Ready(_, quote) => Some(quote),
            _ => None,
        }
    }

    pub fn quote_error(&self) -> Option<&str> {
        match &self.quote {
            QuoteView::Failed(_, reason) => Some(reason),
            QuoteView::Ready(_, quote) => quote.error_message.as_deref(),
            _ => None,
        }
    }

    pub fn is_quote_loading(&self) -> bool {
        matches!(self.quote, QuoteView::Loading(_))
    }

    pub fn summary(&self) -> Option<QuoteSummary> {
        let decimals = self.output_token.as_ref()?.decimals;
        self.quote().map(|q| QuoteSummary::new(q, decimals))
    }

    pub fn select(&mut self, side: Side, token: Token) -> Result<Selection> {
        match side {
            Side::Input => self.select_input(token),
            Side::Output => self.select_output(token),
        }
    }

    /// Choose the token to sell. Picking the current output token swaps the
    /// two sides instead.
    pub fn select_input(&mut self, token: Token) -> Result<Selection> {
        if self.output_token.as_ref().is_some_and(|t| t.id == token.id) {
            if self.input_token.is_some() {
                self.swap_direction();
                return Ok(Selection::Swapped);
            }
            return Err(AppError::validation(ERR_SAME_TOKEN));
        }
        self.input_amount = amount::normalize_decimal_input(&self.input_amount, token.decimals.into());
        self.input_token = Some(token);
        self.invalidate_quote();
        Ok(Selection::Selected)
    }

    /// Choose the token to buy. Picking the current input token swaps the
    /// two sides instead.
    pub fn select_output(&mut self, token: Token) -> Result<Selection> {
        if self.input_token.as_ref().is_some_and(|t| t.id == token.id) {
            if self.output_token.is_some() {
                self.swap_direction();
                return Ok(Selection::Swapped);
            }
            return Err(AppError::validation(ERR_SAME_TOKEN));
        }
        self.output_token = Some(token);
        self.invalidate_quote();
        Ok(Selection::Selected)
    }

    /// Flip input and output, tokens and amounts alike.
    pub fn swap_direction(&mut self) {
        std::mem::swap(&mut self.input_token, &mut self.output_token);
        std::mem::swap(&mut self.input_amount, &mut self.output_amount);
        // A quoted output carries the full precision of its token
        self.input_amount =
            amount::normalize_decimal_input(&self.input_amount, precision(&self.input_token));
        self.output_amount =
            amount::normalize_decimal_input(&self.output_amount, precision(&self.output_token));
        self.invalidate_quote();
    }

    pub fn set_input_amount(&mut self, raw: &str) {
        self.input_amount = amount::normalize_decimal_input(raw, precision(&self.input_token));
        if self.input_amount.is_empty() {
            self.output_amount.clear();
        }
        self.invalidate_quote();
    }

    pub fn set_output_amount(&mut self, raw: &str) {
        self.output_amount = amount::normalize_decimal_input(raw, precision(&self.output_token));
        if self.output_amount.is_empty() {
            self.input_amount.clear();
        }
    }

    /// Clamp the input amount when the field loses focus.
    pub fn blur_input_amount(&mut self, min: f64, max: f64) {
        if self.input_amount.is_empty() {
            return;
        }
        let clamped = amount::clamp_decimal(&self.input_amount, min, max, precision(&self.input_token));
        if clamped != self.input_amount {
            self.set_input_amount(&clamped);
        }
    }

    pub fn set_slippage_bps(&mut self, bps: u16) -> Result<()> {
        if !(MIN_SLIPPAGE_BPS..=MAX_SLIPPAGE_BPS).contains(&bps) {
            return Err(AppError::validation(format!(
                "Slippage must be between {}% and {}%",
                MIN_SLIPPAGE_BPS as f64 / 100.0,
                MAX_SLIPPAGE_BPS as f64 / 100.0
            )));
        }
        if bps != self.slippage_bps {
            self.slippage_bps = bps;
            self.invalidate_quote();
        }
        Ok(())
    }

    /// Input amount in base units of the input token.
    pub fn raw_input_amount(&self) -> Result<BigUint> {
        let token = self
            .input_token
            .as_ref()
            .ok_or_else(|| AppError::validation("Select Input Token"))?;
        amount::to_base_units(&self.input_amount, token.decimals)
    }

    /// Request for the quote poller, or `None` while the form cannot be quoted.
    pub fn quote_request(&self, taker: Option<&str>) -> Option<QuoteRequest> {
        let input = self.input_token.clone()?;
        let output = self.output_token.clone()?;
        if !amount::is_positive_amount(&self.input_amount) {
            return None;
        }
        let units = self.raw_input_amount().ok()?;
        QuoteRequest::new(input, output, units, self.slippage_bps, taker.map(str::to_string))
    }

    pub fn quote_key(&self, taker: Option<&str>) -> Option<QuoteKey> {
        self.quote_request(taker).map(|r| r.key())
    }

    /// Apply a poller state if it was computed for the current inputs.
    ///
    /// Returns `false` and leaves the form untouched for stale states.
    pub fn apply_quote(&mut self, state: &QuoteState, taker: Option<&str>) -> bool {
        let current = self.quote_key(taker);
        match state {
            QuoteState::Idle => {
                if current.is_some() {
                    return false;
                }
                self.quote = QuoteView::None;
                true
            }
            QuoteState::Loading { key } => {
                if current.as_ref() != Some(key) {
                    return false;
                }
                if !matches!(&self.quote, QuoteView::Ready(k, _) if k == key) {
                    self.quote = QuoteView::Loading(key.clone());
                }
                true
            }
            QuoteState::Ready { key, quote } => {
                if current.as_ref() != Some(key) {
                    return false;
                }
                self.output_amount = match &self.output_token {
                    Some(out) => amount::from_base_units(&quote.out_amount, out.decimals),
                    None => String::new(),
                };
                self.quote = QuoteView::Ready(key.clone(), quote.clone());
                true
            }
            QuoteState::Failed { key, reason } => {
                if current.as_ref() != Some(key) {
                    return false;
                }
                self.output_amount.clear();
                self.quote = QuoteView::Failed(key.clone(), reason.clone());
                true
            }
        }
    }

    /// Label of the primary action button.
    pub fn action_label(&self, taker: Option<&str>) -> String {
        if taker.is_none() {
            return "Connect Wallet".into();
        }
        if self.input_token.is_none() {
            return "Select Input Token".into();
        }
        if self.output_token.is_none() {
            return "Select Output Token".into();
        }
        if self.input_amount.is_empty() {
            return "Enter Amount".into();
        }
        if self.is_quote_loading() {
            return "Getting Quote...".into();
        }
        if let Some(reason) = self.quote_error() {
            return reason.to_string();
        }
        if self.executing {
            return "Executing Swap...".into();
        }
        "Swap".into()
    }

    pub fn can_swap(&self, taker: Option<&str>) -> bool {
        taker.is_some()
            && self.input_token.is_some()
            && self.output_token.is_some()
            && amount::is_positive_amount(&self.input_amount)
            && amount::is_positive_amount(&self.output_amount)
            && !self.is_quote_loading()
            && self.quote_error().is_none()
            && !self.executing
            && self.quote_matches(taker)
    }

    /// Whether the held quote was computed for the current inputs.
    pub fn quote_matches(&self, taker: Option<&str>) -> bool {
        match (&self.quote, self.quote_key(taker)) {
            (QuoteView::Ready(key, _), Some(current)) => *key == current,
            _ => false,
        }
    }

    /// Clear both amounts and the quote.
    pub fn reset_amounts(&mut self) {
        self.input_amount.clear();
        self.output_amount.clear();
        self.quote = QuoteView::None;
    }

    fn invalidate_quote(&mut self) {
        self.quote = QuoteView::None;
    }
}

fn precision(token: &Option<Token>) -> u32 {
    token
        .as_ref()
        .map_or(amount::MAX_FRACTION_DIGITS, |t| t.decimals.into())
}
