//! Order building: ask the aggregator for a quote bound to the taker's wallet
//! and unwrap the transaction it wants signed.

use crate::aggregator::SwapAggregator;
use crate::errors::{AppError, Result};
use crate::models::{OrderParams, Quote};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

/// A quote the aggregator is ready to execute once it is signed.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub request_id: String,
    /// Serialized transaction awaiting the taker's signature.
    pub unsigned_transaction: Vec<u8>,
    pub quote: Quote,
}

pub async fn create_order(aggregator: &dyn SwapAggregator, params: &OrderParams) -> Result<Order> {
    let taker = params
        .taker
        .as_deref()
        .ok_or_else(|| AppError::wallet("Connect a wallet to place an order"))?;
    debug!(taker, amount = %params.amount, "[ORDER] requesting");

    let quote = aggregator.order(params).await?;
    let Some(encoded) = quote.transaction.as_deref().filter(|t| !t.is_empty()) else {
        let reason = quote
            .error_message
            .clone()
            .unwrap_or_else(|| "Aggregator returned no transaction".to_string());
        return Err(AppError::aggregator(reason));
    };
    if quote.request_id.is_empty() {
        return Err(AppError::aggregator("Aggregator returned no request id"));
    }

    let unsigned_transaction = STANDARD.decode(encoded)?;
    info!(
        request_id = %quote.request_id,
        out_amount = %quote.out_amount,
        bytes = unsigned_transaction.len(),
        "[ORDER] ready for signature"
    );
    Ok(Order {
        request_id: quote.request_id.clone(),
        unsigned_transaction,
        quote,
    })
}
