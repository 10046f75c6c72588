//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use crate::swap::form::{MAX_SLIPPAGE_BPS, MIN_SLIPPAGE_BPS};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const DEFAULT_JUPITER_URL: &str = "https://lite-api.jup.ag/ultra/v1";
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_EXPLORER_TX_URL: &str = "https://solscan.io/tx";
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// Consolidated application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the swap aggregator (`/search`, `/order`, `/execute` live under it).
    pub jupiter_url: String,
    /// JSON-RPC endpoint probed by the health ping.
    pub solana_rpc_url: String,
    /// Prefix for transaction links; the signature is appended.
    pub explorer_tx_url: String,
    /// Quiet period before a token search fires.
    pub search_debounce: Duration,
    /// Interval between quote refreshes while a quote is wanted.
    pub quote_refresh: Duration,
    pub default_slippage_bps: u16,
    pub http_timeout: Duration,
    pub rpc_ping_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jupiter_url: DEFAULT_JUPITER_URL.into(),
            solana_rpc_url: DEFAULT_SOLANA_RPC_URL.into(),
            explorer_tx_url: DEFAULT_EXPLORER_TX_URL.into(),
            search_debounce: Duration::from_millis(1000),
            quote_refresh: Duration::from_secs(15),
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            http_timeout: Duration::from_secs(10),
            rpc_ping_interval: Duration::from_secs(15),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jupiter_url = match get("JUPITER_URL") {
            Some(v) => validated_url("JUPITER_URL", &v)?,
            None => defaults.jupiter_url,
        };
        let solana_rpc_url = match get("SOLANA_RPC_URL") {
            Some(v) => validated_url("SOLANA_RPC_URL", &v)?,
            None => defaults.solana_rpc_url,
        };
        let explorer_tx_url = match get("EXPLORER_TX_URL") {
            Some(v) => validated_url("EXPLORER_TX_URL", &v)?,
            None => defaults.explorer_tx_url,
        };

        let search_debounce = get("SEARCH_DEBOUNCE_MS")
            .map(|v| parse_number::<u64>("SEARCH_DEBOUNCE_MS", &v))
            .transpose()?
            .map_or(defaults.search_debounce, Duration::from_millis);
        let quote_refresh = get("QUOTE_REFRESH_SECS")
            .map(|v| parse_number::<u64>("QUOTE_REFRESH_SECS", &v))
            .transpose()?
            .map_or(defaults.quote_refresh, Duration::from_secs);
        let http_timeout = get("HTTP_TIMEOUT_SECS")
            .map(|v| parse_number::<u64>("HTTP_TIMEOUT_SECS", &v))
            .transpose()?
            .map_or(defaults.http_timeout, Duration::from_secs);
        let rpc_ping_interval = get("RPC_PING_INTERVAL_SECS")
            .map(|v| parse_number::<u64>("RPC_PING_INTERVAL_SECS", &v))
            .transpose()?
            .map_or(defaults.rpc_ping_interval, Duration::from_secs);
        let default_slippage_bps = get("DEFAULT_SLIPPAGE_BPS")
            .map(|v| parse_number::<u16>("DEFAULT_SLIPPAGE_BPS", &v))
            .transpose()?
            .unwrap_or(defaults.default_slippage_bps);

        if quote_refresh.is_zero() {
            return Err(AppError::config("QUOTE_REFRESH_SECS must be greater than zero"));
        }
        if rpc_ping_interval.is_zero() {
            return Err(AppError::config("RPC_PING_INTERVAL_SECS must be greater than zero"));
        }
        if !(MIN_SLIPPAGE_BPS..=MAX_SLIPPAGE_BPS).contains(&default_slippage_bps) {
            return Err(AppError::config(format!(
                "DEFAULT_SLIPPAGE_BPS must be between {MIN_SLIPPAGE_BPS} and {MAX_SLIPPAGE_BPS}"
            )));
        }

        Ok(Self {
            jupiter_url,
            solana_rpc_url,
            explorer_tx_url,
            search_debounce,
            quote_refresh,
            default_slippage_bps,
            http_timeout,
            rpc_ping_interval,
        })
    }

    /// Explorer link for a transaction signature.
    pub fn explorer_link(&self, signature: &str) -> String {
        format!("{}/{}", self.explorer_tx_url.trim_end_matches('/'), signature)
    }
}

fn validated_url(key: &str, value: &str) -> Result<String> {
    let parsed = Url::parse(value.trim())
        .map_err(|e| AppError::config(format!("{key} is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(format!("{key} must use http or https")));
    }
    Ok(value.trim().trim_end_matches('/').to_string())
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{key} must be a non-negative integer, got {value:?}")))
}
