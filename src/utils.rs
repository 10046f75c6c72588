//! Miscellaneous helper utilities.

use crate::errors::{AppError, Result};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Coarse grading of RPC latency for a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingLevel {
    Good,
    Degraded,
    Poor,
    Disconnected,
}

impl PingLevel {
    pub fn from_latency(latency_ms: Option<u64>) -> Self {
        match latency_ms {
            None => Self::Disconnected,
            Some(ms) if ms < 100 => Self::Good,
            Some(ms) if ms < 200 => Self::Degraded,
            Some(_) => Self::Poor,
        }
    }
}

fn health_request(client: &reqwest::Client, rpc_url: &str) -> Result<reqwest::Request> {
    let body = json!({ "jsonrpc": "2.0", "id": 1, "method": "getHealth" });
    Ok(client.post(rpc_url).json(&body).build()?)
}

/// Send a `getHealth` call and return the one-way latency estimate in ms
/// (half the round trip).
pub async fn ping_rpc(client: &reqwest::Client, rpc_url: &str) -> Result<u64> {
    let request = health_request(client, rpc_url)?;
    let started = Instant::now();
    let response = client.execute(request).await?;
    let elapsed = started.elapsed();
    if !response.status().is_success() {
        return Err(AppError::http(format!("RPC health check returned {}", response.status())));
    }
    Ok((elapsed.as_millis() / 2) as u64)
}

/// Spawns a background task that pings the RPC endpoint every `interval` and
/// publishes the latest latency on `tx`, `None` while the endpoint is
/// unreachable.
pub fn spawn_rpc_ping_watcher(
    rpc_url: &str,
    tx: watch::Sender<Option<u64>>,
    interval: Duration,
    timeout: Duration,
) -> Result<JoinHandle<()>> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let rpc_url = rpc_url.to_string();
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let latency = match ping_rpc(&client, &rpc_url).await {
                Ok(ms) => {
                    debug!(latency_ms = ms, "[RPC] ping");
                    Some(ms)
                }
                Err(e) => {
                    warn!(error = %e, "[RPC] ping failed");
                    None
                }
            };
            if tx.send(latency).is_err() {
                return;
            }
        }
    });
    Ok(handle)
}
