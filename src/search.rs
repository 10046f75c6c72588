//! Debounced token search.
//!
//! Keystrokes are pushed with [`TokenSearch::set_query`]; a background task
//! waits for the input to go quiet for the debounce window and only then
//! asks the aggregator. Results are published on a `watch` channel.

use crate::aggregator::SwapAggregator;
use crate::errors::{AppError, Result};
use crate::models::Token;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the token picker should show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    /// Nothing typed yet (or the query was cleared).
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Results {
        query: String,
        tokens: Vec<Token>,
    },
    Failed {
        query: String,
        reason: String,
    },
}

impl SearchState {
    pub fn tokens(&self) -> &[Token] {
        match self {
            Self::Results { tokens, .. } => tokens,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Handle to the debounced search task. Dropping it stops the task.
pub struct TokenSearch {
    query_tx: watch::Sender<String>,
    state_rx: watch::Receiver<SearchState>,
    handle: JoinHandle<()>,
}

impl TokenSearch {
    pub fn spawn(aggregator: Arc<dyn SwapAggregator>, debounce: Duration) -> Self {
        let (query_tx, query_rx) = watch::channel(String::new());
        let (state_tx, state_rx) = watch::channel(SearchState::Idle);
        let handle = tokio::spawn(run_search_loop(aggregator, debounce, query_rx, state_tx));
        Self {
            query_tx,
            state_rx,
            handle,
        }
    }

    /// Record the latest text; restarts the debounce window.
    pub fn set_query(&self, query: impl Into<String>) {
        self.query_tx.send_replace(query.into());
    }

    pub fn state(&self) -> SearchState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state_rx.clone()
    }

    /// Abort the task and any pending debounce timer.
    pub fn stop(self) {}
}

impl Drop for TokenSearch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_search_loop(
    aggregator: Arc<dyn SwapAggregator>,
    debounce: Duration,
    mut query_rx: watch::Receiver<String>,
    state_tx: watch::Sender<SearchState>,
) {
    loop {
        if query_rx.changed().await.is_err() {
            return;
        }

        // Keep restarting the window while input keeps arriving
        loop {
            match tokio::time::timeout(debounce, query_rx.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => return,
                Err(_elapsed) => break,
            }
        }

        let query = query_rx.borrow_and_update().trim().to_string();
        if query.is_empty() {
            state_tx.send_replace(SearchState::Idle);
            continue;
        }

        state_tx.send_replace(SearchState::Loading {
            query: query.clone(),
        });
        debug!(%query, "[SEARCH] querying");
        let result = aggregator.search(&query).await;

        if query_rx.has_changed().unwrap_or(false) {
            debug!(%query, "[SEARCH] superseded, dropping result");
            continue;
        }

        let next = match result {
            Ok(tokens) => {
                info!(%query, found = tokens.len(), "[SEARCH] results");
                SearchState::Results { query, tokens }
            }
            Err(e) => {
                warn!(error = %e, %query, "[SEARCH] search failed");
                SearchState::Failed {
                    query,
                    reason: e.reason(),
                }
            }
        };
        state_tx.send_replace(next);
    }
}

/// Pick a token for a mint address or symbol with a single search.
///
/// Exact mint match wins, then a case-insensitive symbol match, then the
/// first result.
pub async fn resolve_token(aggregator: &dyn SwapAggregator, needle: &str) -> Result<Token> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Err(AppError::validation("token query is empty"));
    }
    let mut tokens = aggregator.search(needle).await?;
    let index = tokens
        .iter()
        .position(|t| t.id == needle)
        .or_else(|| {
            tokens
                .iter()
                .position(|t| t.symbol.eq_ignore_ascii_case(needle))
        })
        .or(if tokens.is_empty() { None } else { Some(0) });
    match index {
        Some(i) => Ok(tokens.swap_remove(i)),
        None => Err(AppError::validation(format!("no token found for {needle:?}"))),
    }
}
