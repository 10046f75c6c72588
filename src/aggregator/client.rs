use crate::aggregator::SwapAggregator;
use crate::aggregator::api_types::{
    ErrorBody, ExecuteRequest, ExecuteResponse, OrderQuery, OrderResponse, SearchItem,
};
use crate::errors::{AppError, Result};
use crate::models::{ExecutionReport, OrderParams, Quote, Token};
use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const SEARCH_ENDPOINT: &str = "/search";
const ORDER_ENDPOINT: &str = "/order";
const EXECUTE_ENDPOINT: &str = "/execute";

/// HTTP client for the aggregator's search / order / execute endpoints.
#[derive(Debug, Clone)]
pub struct AggregatorClient {
    base_url: String,
    http_client: Client,
}

impl AggregatorClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::http)?;
        Ok(Self::with_client(base_url, http_client))
    }

    /// Reuse an existing `reqwest` client.
    pub fn with_client(base_url: &str, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn search_request(&self, query: &str) -> Result<Request> {
        Ok(self
            .http_client
            .get(self.endpoint(SEARCH_ENDPOINT))
            .query(&[("query", query)])
            .build()?)
    }

    fn order_request(&self, params: &OrderParams) -> Result<Request> {
        Ok(self
            .http_client
            .get(self.endpoint(ORDER_ENDPOINT))
            .query(&OrderQuery::from(params))
            .build()?)
    }

    fn execute_request(&self, signed_transaction: &str, request_id: &str) -> Result<Request> {
        let body = ExecuteRequest {
            signed_transaction: signed_transaction.to_string(),
            request_id: request_id.to_string(),
        };
        Ok(self
            .http_client
            .post(self.endpoint(EXECUTE_ENDPOINT))
            .json(&body)
            .build()?)
    }

    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        debug!(method = %request.method(), url = %request.url(), "[AGG] request");
        let response = self.http_client.execute(request).await?;
        handle_http_response(response).await
    }
}

#[async_trait]
impl SwapAggregator for AggregatorClient {
    async fn search(&self, query: &str) -> Result<Vec<Token>> {
        let items: Vec<SearchItem> = self.send(self.search_request(query)?).await?;
        Ok(items.into_iter().map(Token::from).collect())
    }

    async fn order(&self, params: &OrderParams) -> Result<Quote> {
        let resp: OrderResponse = self.send(self.order_request(params)?).await?;
        Quote::try_from(resp)
    }

    async fn execute(&self, signed_transaction: &str, request_id: &str) -> Result<ExecutionReport> {
        let request = self.execute_request(signed_transaction, request_id)?;
        let resp: ExecuteResponse = self.send(request).await?;
        Ok(resp.into())
    }
}

/// Deserialize a successful body, or turn a non-2xx status into `AppError::Http`
/// carrying the server's message.
async fn handle_http_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.error_message.or(b.error))
            .unwrap_or(text);
        warn!(%status, %message, "[AGG] request failed");
        return Err(AppError::http(format!("{status}: {message}")));
    }
    serde_json::from_str(&text).map_err(AppError::from)
}
