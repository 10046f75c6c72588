//! Submission of a signed order.

use super::order::Order;
use crate::aggregator::SwapAggregator;
use crate::errors::{AppError, Result};
use crate::models::ExecutionReport;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};

/// Send the signed transaction together with the order's request id.
///
/// The order is consumed: a request id is only ever submitted once.
///
/// A report is returned for both `Success` and `Failed`; only transport or
/// decoding problems are errors.
pub async fn submit(
    aggregator: &dyn SwapAggregator,
    order: Order,
    signed_transaction: &[u8],
) -> Result<ExecutionReport> {
    submit_signed(aggregator, &order.request_id, signed_transaction).await
}

/// Submit signed bytes for a request id obtained out of band.
pub async fn submit_signed(
    aggregator: &dyn SwapAggregator,
    request_id: &str,
    signed_transaction: &[u8],
) -> Result<ExecutionReport> {
    if signed_transaction.is_empty() {
        return Err(AppError::wallet("Wallet returned an empty transaction"));
    }
    if request_id.is_empty() {
        return Err(AppError::validation("request id is empty"));
    }
    let encoded = STANDARD.encode(signed_transaction);
    let report = aggregator.execute(&encoded, request_id).await?;

    if report.status.is_success() {
        info!(
            request_id,
            signature = report.signature.as_deref().unwrap_or("-"),
            "[EXECUTE] swap landed"
        );
    } else {
        warn!(
            request_id,
            status = ?report.status,
            error = report.error.as_deref().unwrap_or("-"),
            "[EXECUTE] swap not successful"
        );
    }
    Ok(report)
}
