//! Wire types of the aggregator's HTTP API

use crate::errors::{AppError, Result};
use crate::models::{ExecutionReport, OrderParams, Quote, SwapStatus, Token};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One entry of the `/search` response array.
///
/// The endpoint returns far more (stats, audit, supply); only what the swap
/// flow uses is kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub usd_price: Option<f64>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<SearchItem> for Token {
    fn from(item: SearchItem) -> Self {
        Token {
            id: item.id,
            symbol: item.symbol,
            name: item.name,
            decimals: item.decimals,
            usd_price: item.usd_price,
            is_verified: item.is_verified.unwrap_or(false),
            icon: item.icon,
            tags: item.tags,
        }
    }
}

/// Query string of `GET /order`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taker: Option<String>,
}

impl From<&OrderParams> for OrderQuery {
    fn from(params: &OrderParams) -> Self {
        OrderQuery {
            input_mint: params.input_mint.clone(),
            output_mint: params.output_mint.clone(),
            amount: params.amount.to_string(),
            slippage_bps: params.slippage_bps,
            taker: params.taker.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlanEntry {
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub bps: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFee {
    #[serde(default)]
    pub amount: Option<String>,
    pub fee_bps: u32,
}

/// Body of `GET /order`. Every field is optional because error payloads
/// only carry `error`/`errorMessage`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub input_mint: Option<String>,
    pub output_mint: Option<String>,
    pub in_amount: Option<String>,
    pub out_amount: Option<String>,
    pub other_amount_threshold: Option<String>,
    pub slippage_bps: Option<u16>,
    pub price_impact_pct: Option<String>,
    #[serde(default)]
    pub route_plan: Vec<RoutePlanEntry>,
    pub fee_bps: Option<u32>,
    pub transaction: Option<String>,
    pub signature_fee_lamports: Option<u64>,
    pub request_id: Option<String>,
    pub platform_fee: Option<PlatformFee>,
    pub in_usd_value: Option<f64>,
    pub out_usd_value: Option<f64>,
    pub error: Option<String>,
    pub error_message: Option<String>,
}

impl TryFrom<OrderResponse> for Quote {
    type Error = AppError;

    fn try_from(resp: OrderResponse) -> Result<Self> {
        let advisory = resp
            .error_message
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| resp.error.clone().filter(|m| !m.is_empty()));

        let Some(out_amount) = resp.out_amount.as_deref() else {
            return Err(AppError::aggregator(
                advisory.unwrap_or_else(|| "order response has no outAmount".into()),
            ));
        };

        let in_amount = parse_units("inAmount", resp.in_amount.as_deref().unwrap_or("0"))?;
        let out_amount = parse_units("outAmount", out_amount)?;
        let other_amount_threshold = match resp.other_amount_threshold.as_deref() {
            Some(v) => parse_units("otherAmountThreshold", v)?,
            None => out_amount.clone(),
        };
        let price_impact_pct = match resp.price_impact_pct.as_deref() {
            Some(v) => v
                .parse::<f64>()
                .map_err(|e| AppError::parse(format!("priceImpactPct {v:?}: {e}")))?,
            None => 0.0,
        };

        Ok(Quote {
            input_mint: resp.input_mint.unwrap_or_default(),
            output_mint: resp.output_mint.unwrap_or_default(),
            in_amount,
            out_amount,
            other_amount_threshold,
            slippage_bps: resp.slippage_bps.unwrap_or_default(),
            price_impact_pct,
            fee_bps: resp.fee_bps.unwrap_or_default(),
            platform_fee_bps: resp.platform_fee.map(|f| f.fee_bps),
            signature_fee_lamports: resp.signature_fee_lamports.unwrap_or_default(),
            route_hops: resp.route_plan.len(),
            in_usd_value: resp.in_usd_value,
            out_usd_value: resp.out_usd_value,
            request_id: resp.request_id.unwrap_or_default(),
            transaction: resp.transaction.filter(|t| !t.is_empty()),
            error_message: advisory,
        })
    }
}

fn parse_units(field: &str, value: &str) -> Result<BigUint> {
    BigUint::from_str(value).map_err(|e| AppError::parse(format!("{field} {value:?}: {e}")))
}

/// Body of `POST /execute`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub signed_transaction: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub status: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<ExecuteResponse> for ExecutionReport {
    fn from(resp: ExecuteResponse) -> Self {
        ExecutionReport {
            status: SwapStatus::parse(&resp.status),
            signature: resp.signature.filter(|s| !s.is_empty()),
            code: resp.code,
            error: resp.error,
        }
    }
}

/// Shape of an error body on non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: Option<String>,
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"[{
        "id": "So11111111111111111111111111111111111111112",
        "name": "Wrapped SOL",
        "symbol": "SOL",
        "icon": "https://example.invalid/sol.png",
        "decimals": 9,
        "circSupply": 546952946.33,
        "isVerified": true,
        "tags": ["verified", "strict"],
        "usdPrice": 188.95,
        "audit": {"mintAuthorityDisabled": true}
    }, {
        "id": "Mint2",
        "name": "Unlisted",
        "symbol": "UNL",
        "decimals": 6
    }]"#;

    const ORDER_BODY: &str = r#"{
        "mode": "ultra",
        "inputMint": "So11111111111111111111111111111111111111112",
        "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        "inAmount": "1000000000",
        "outAmount": "188123456",
        "otherAmountThreshold": "187182839",
        "swapMode": "ExactIn",
        "slippageBps": 50,
        "priceImpactPct": "-0.0012",
        "routePlan": [
            {"swapInfo": {"ammKey": "a", "label": "X"}, "percent": 100, "bps": 10000},
            {"swapInfo": {"ammKey": "b", "label": "Y"}, "percent": 100, "bps": 10000}
        ],
        "feeBps": 5,
        "transaction": "AQID",
        "signatureFeeLamports": 5000,
        "requestId": "req-1",
        "platformFee": {"amount": "9406", "feeBps": 5},
        "inUsdValue": 188.9,
        "outUsdValue": 188.1
    }"#;

    #[test]
    fn search_items_map_to_tokens() {
        let items: Vec<SearchItem> = serde_json::from_str(SEARCH_BODY).expect("json should parse");
        let tokens: Vec<Token> = items.into_iter().map(Token::from).collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol, "SOL");
        assert_eq!(tokens[0].decimals, 9);
        assert!(tokens[0].is_verified);
        assert_eq!(tokens[0].usd_price, Some(188.95));
        assert!(!tokens[1].is_verified);
        assert_eq!(tokens[1].usd_price, None);
    }

    #[test]
    fn order_body_converts_to_quote() {
        let resp: OrderResponse = serde_json::from_str(ORDER_BODY).expect("json should parse");
        let quote = Quote::try_from(resp).expect("quote");
        assert_eq!(quote.in_amount, BigUint::from(1_000_000_000u64));
        assert_eq!(quote.out_amount, BigUint::from(188_123_456u64));
        assert_eq!(quote.other_amount_threshold, BigUint::from(187_182_839u64));
        assert_eq!(quote.route_hops, 2);
        assert_eq!(quote.platform_fee_bps, Some(5));
        assert_eq!(quote.request_id, "req-1");
        assert_eq!(quote.transaction.as_deref(), Some("AQID"));
        assert!(quote.error_message.is_none());
        assert!((quote.price_impact_pct + 0.0012).abs() < 1e-12);
    }

    #[test]
    fn error_only_body_is_an_aggregator_error() {
        let resp: OrderResponse =
            serde_json::from_str(r#"{"error":"Route not found"}"#).expect("json should parse");
        assert_eq!(
            Quote::try_from(resp),
            Err(AppError::Aggregator("Route not found".into()))
        );
    }

    #[test]
    fn advisory_is_kept_alongside_a_priced_quote() {
        let resp: OrderResponse = serde_json::from_str(
            r#"{"inAmount":"10","outAmount":"20","transaction":null,"requestId":"r",
                "errorCode":1,"errorMessage":"Insufficient funds"}"#,
        )
        .expect("json should parse");
        let quote = Quote::try_from(resp).expect("quote");
        assert_eq!(quote.error_message.as_deref(), Some("Insufficient funds"));
        assert!(quote.transaction.is_none());
        assert_eq!(quote.other_amount_threshold, BigUint::from(20u32));
    }

    #[test]
    fn order_query_omits_missing_taker() {
        let params = OrderParams {
            input_mint: "A".into(),
            output_mint: "B".into(),
            amount: BigUint::from(5u32),
            slippage_bps: Some(50),
            taker: None,
        };
        let json = serde_json::to_value(OrderQuery::from(&params)).unwrap();
        assert_eq!(json["inputMint"], "A");
        assert_eq!(json["amount"], "5");
        assert_eq!(json["slippageBps"], 50);
        assert!(json.get("taker").is_none());
    }

    #[test]
    fn execute_response_maps_status() {
        let resp: ExecuteResponse =
            serde_json::from_str(r#"{"status":"Failed","signature":"sig","code":-1,"error":"slippage"}"#)
                .unwrap();
        let report = ExecutionReport::from(resp);
        assert_eq!(report.status, SwapStatus::Failed);
        assert_eq!(report.signature.as_deref(), Some("sig"));
        assert_eq!(report.error.as_deref(), Some("slippage"));
    }
}
