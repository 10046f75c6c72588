//! One swap attempt from quote to settlement.
//!
//! [`SwapFlow::execute`] walks `Quoting → Ordering → AwaitingSignature →
//! Submitting` and ends in `Succeeded` or `Failed`. The terminal phase stays
//! published until [`SwapFlow::acknowledge`] returns it to `Idle`; the next
//! attempt always starts from there.

use super::execute::submit;
use super::form::SwapForm;
use super::order::create_order;
use crate::aggregator::SwapAggregator;
use crate::errors::{AppError, Result};
use crate::models::{ExecutionReport, SwapStatus};
use crate::quote::QuoteState;
use crate::wallet::WalletSession;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Progress of a single swap attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SwapPhase {
    #[default]
    Idle,
    Quoting,
    Ordering,
    AwaitingSignature,
    Submitting,
    Succeeded {
        signature: String,
        explorer_link: String,
    },
    Failed {
        reason: String,
        explorer_link: Option<String>,
    },
}

impl SwapPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    pub fn explorer_link(&self) -> Option<&str> {
        match self {
            Self::Succeeded { explorer_link, .. } => Some(explorer_link),
            Self::Failed { explorer_link, .. } => explorer_link.as_deref(),
            _ => None,
        }
    }
}

/// Terminal result of [`SwapFlow::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Succeeded {
        signature: String,
        explorer_link: String,
    },
    Failed {
        reason: String,
        explorer_link: Option<String>,
    },
}

impl SwapOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            explorer_link: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

impl From<&SwapOutcome> for SwapPhase {
    fn from(outcome: &SwapOutcome) -> Self {
        match outcome.clone() {
            SwapOutcome::Succeeded {
                signature,
                explorer_link,
            } => Self::Succeeded {
                signature,
                explorer_link,
            },
            SwapOutcome::Failed {
                reason,
                explorer_link,
            } => Self::Failed {
                reason,
                explorer_link,
            },
        }
    }
}

/// Drives quote → order → sign → submit for the form it is handed.
pub struct SwapFlow {
    aggregator: Arc<dyn SwapAggregator>,
    wallet: Arc<dyn WalletSession>,
    explorer_tx_url: String,
    phase_tx: watch::Sender<SwapPhase>,
}

impl SwapFlow {
    pub fn new(
        aggregator: Arc<dyn SwapAggregator>,
        wallet: Arc<dyn WalletSession>,
        explorer_tx_url: impl Into<String>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SwapPhase::Idle);
        Self {
            aggregator,
            wallet,
            explorer_tx_url: explorer_tx_url.into(),
            phase_tx,
        }
    }

    pub fn phase(&self) -> SwapPhase {
        self.phase_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SwapPhase> {
        self.phase_tx.subscribe()
    }

    /// Dismiss a terminal result.
    pub fn acknowledge(&self) {
        self.phase_tx.send_if_modified(|phase| {
            if phase.is_terminal() {
                *phase = SwapPhase::Idle;
                return true;
            }
            false
        });
    }

    fn explorer_link(&self, signature: &str) -> String {
        format!("{}/{}", self.explorer_tx_url.trim_end_matches('/'), signature)
    }

    fn enter(&self, phase: SwapPhase) {
        self.phase_tx.send_replace(phase);
    }

    /// Run one attempt. Failures never escape as errors; they end the
    /// attempt in [`SwapOutcome::Failed`] with the form's amounts intact.
    pub async fn execute(&self, form: &mut SwapForm) -> SwapOutcome {
        self.enter(SwapPhase::Idle);
        form.set_executing(true);
        let outcome = self.attempt(form).await;
        form.set_executing(false);

        match &outcome {
            SwapOutcome::Succeeded { signature, .. } => {
                info!(%signature, "[SWAP] succeeded");
                form.reset_amounts();
            }
            SwapOutcome::Failed { reason, .. } => warn!(%reason, "[SWAP] failed"),
        }
        self.enter(SwapPhase::from(&outcome));
        outcome
    }

    async fn attempt(&self, form: &mut SwapForm) -> SwapOutcome {
        let Some(taker) = self.wallet.address() else {
            return SwapOutcome::failed("Connect Wallet");
        };

        self.enter(SwapPhase::Quoting);
        if let Err(e) = self.ensure_quote(form, &taker).await {
            return SwapOutcome::failed(e.reason());
        }
        let Some(request) = form.quote_request(Some(&taker)) else {
            return SwapOutcome::failed("Enter Amount");
        };

        self.enter(SwapPhase::Ordering);
        let order = match create_order(self.aggregator.as_ref(), &request.order_params()).await {
            Ok(order) => order,
            Err(e) => return SwapOutcome::failed(e.reason()),
        };

        self.enter(SwapPhase::AwaitingSignature);
        let signed = match self.wallet.sign_transaction(&order.unsigned_transaction).await {
            Ok(signed) => signed,
            Err(e) => return SwapOutcome::failed(e.reason()),
        };

        self.enter(SwapPhase::Submitting);
        match submit(self.aggregator.as_ref(), order, &signed).await {
            Ok(report) => self.settle(report),
            Err(e) => SwapOutcome::failed(e.reason()),
        }
    }

    /// Make sure the form holds a quote computed for its current inputs.
    async fn ensure_quote(&self, form: &mut SwapForm, taker: &str) -> Result<()> {
        let request = form
            .quote_request(Some(taker))
            .ok_or_else(|| AppError::validation(form.action_label(Some(taker))))?;
        if form.quote_matches(Some(taker)) {
            return match form.quote_error() {
                Some(reason) => Err(AppError::validation(reason)),
                None => Ok(()),
            };
        }

        let quote = self.aggregator.order(&request.order_params()).await?;
        let state = QuoteState::Ready {
            key: request.key(),
            quote: Arc::new(quote),
        };
        form.apply_quote(&state, Some(taker));
        Ok(())
    }

    fn settle(&self, report: ExecutionReport) -> SwapOutcome {
        let explorer_link = report.signature.as_deref().map(|s| self.explorer_link(s));
        match (&report.status, report.signature) {
            (SwapStatus::Success, Some(signature)) => SwapOutcome::Succeeded {
                explorer_link: self.explorer_link(&signature),
                signature,
            },
            (SwapStatus::Success, None) => SwapOutcome::failed(
                AppError::settlement("swap reported success without a signature").reason(),
            ),
            (status, _) => {
                if let SwapStatus::Other(raw) = status {
                    warn!(status = %raw, "[SWAP] unrecognized settlement status");
                }
                let reason = report
                    .error
                    .unwrap_or_else(|| "Swap failed".to_string());
                SwapOutcome::Failed {
                    reason,
                    explorer_link,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAggregator, MockWallet, TAKER, quote_for, sol, usdc};

    const EXPLORER: &str = "https://solscan.io/tx";

    fn form_with_quote() -> SwapForm {
        let mut form = SwapForm::default();
        form.select_input(sol()).unwrap();
        form.select_output(usdc()).unwrap();
        form.set_input_amount("1.5");
        let request = form.quote_request(Some(TAKER)).unwrap();
        let state = QuoteState::Ready {
            key: request.key(),
            quote: Arc::new(quote_for(&request.order_params(), 2)),
        };
        assert!(form.apply_quote(&state, Some(TAKER)));
        form
    }

    fn flow(agg: Arc<MockAggregator>, wallet: MockWallet) -> SwapFlow {
        SwapFlow::new(agg, Arc::new(wallet), EXPLORER)
    }

    #[tokio::test]
    async fn success_clears_amounts_and_links_explorer() {
        let agg = Arc::new(MockAggregator::default());
        let wallet = Arc::new(MockWallet::connected());
        let flow = SwapFlow::new(agg.clone(), wallet.clone(), EXPLORER);
        let mut form = form_with_quote();

        let outcome = flow.execute(&mut form).await;
        assert_eq!(
            outcome,
            SwapOutcome::Succeeded {
                signature: "5igNaTuRe".into(),
                explorer_link: "https://solscan.io/tx/5igNaTuRe".into(),
            }
        );
        assert_eq!(form.input_amount(), "");
        assert_eq!(form.output_amount(), "");
        assert!(!form.is_executing());
        assert_eq!(agg.order_count(), 1);
        // AQID is [1, 2, 3]; the mock wallet appends 0xff
        assert_eq!(wallet.signed.lock().unwrap().clone(), vec![vec![1, 2, 3, 0xff]]);
        assert_eq!(agg.execute_calls.lock().unwrap()[0].0, "AQID/w==");
        assert_eq!(flow.phase().explorer_link(), Some("https://solscan.io/tx/5igNaTuRe"));

        flow.acknowledge();
        assert_eq!(flow.phase(), SwapPhase::Idle);
    }

    #[tokio::test]
    async fn failed_settlement_keeps_amounts_and_link() {
        let agg = Arc::new(MockAggregator {
            execute_status: Some("Failed"),
            ..Default::default()
        });
        let flow = flow(agg, MockWallet::connected());
        let mut form = form_with_quote();

        let outcome = flow.execute(&mut form).await;
        assert_eq!(
            outcome,
            SwapOutcome::Failed {
                reason: "Swap failed".into(),
                explorer_link: Some("https://solscan.io/tx/5igNaTuRe".into()),
            }
        );
        assert_eq!(form.input_amount(), "1.5");
        assert_eq!(form.output_amount(), "3000");
    }

    #[tokio::test]
    async fn submit_error_keeps_amounts() {
        let agg = Arc::new(MockAggregator {
            execute_error: Some(AppError::http("503")),
            ..Default::default()
        });
        let flow = flow(agg.clone(), MockWallet::connected());
        let mut form = form_with_quote();

        let outcome = flow.execute(&mut form).await;
        assert_eq!(outcome, SwapOutcome::failed("HTTP error: 503"));
        assert_eq!(form.input_amount(), "1.5");
        assert_eq!(form.output_amount(), "3000");
        assert_eq!(agg.execute_calls.lock().unwrap().len(), 1);
        assert_eq!(flow.phase(), SwapPhase::from(&outcome));
    }

    #[tokio::test]
    async fn unrecognized_status_is_a_failure_that_keeps_amounts() {
        let agg = Arc::new(MockAggregator {
            execute_status: Some("Expired"),
            ..Default::default()
        });
        let flow = flow(agg, MockWallet::connected());
        let mut form = form_with_quote();

        let outcome = flow.execute(&mut form).await;
        assert_eq!(
            outcome,
            SwapOutcome::Failed {
                reason: "Swap failed".into(),
                explorer_link: Some("https://solscan.io/tx/5igNaTuRe".into()),
            }
        );
        assert_eq!(form.input_amount(), "1.5");
        assert_eq!(form.output_amount(), "3000");
    }

    #[tokio::test]
    async fn login_enables_and_logout_disables_swapping() {
        let agg = Arc::new(MockAggregator::default());
        let wallet = Arc::new(MockWallet::disconnected());
        let flow = SwapFlow::new(agg.clone(), wallet.clone(), EXPLORER);

        let mut form = form_with_quote();
        assert_eq!(flow.execute(&mut form).await, SwapOutcome::failed("Connect Wallet"));

        wallet.login().await.unwrap();
        assert_eq!(wallet.address().as_deref(), Some(TAKER));
        assert!(flow.execute(&mut form).await.is_success());

        wallet.logout().await.unwrap();
        let mut form = form_with_quote();
        assert_eq!(flow.execute(&mut form).await, SwapOutcome::failed("Connect Wallet"));
        assert_eq!(agg.execute_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn order_failure_leaves_form_unchanged() {
        let agg = Arc::new(MockAggregator {
            omit_transaction: true,
            ..Default::default()
        });
        let flow = flow(agg.clone(), MockWallet::connected());
        let mut form = form_with_quote();
        let before = form.clone();

        let outcome = flow.execute(&mut form).await;
        assert_eq!(outcome, SwapOutcome::failed("Insufficient funds"));
        assert_eq!(form, before);
        assert!(agg.execute_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_wallet_fails_before_ordering() {
        let agg = Arc::new(MockAggregator::default());
        let flow = flow(agg.clone(), MockWallet::disconnected());
        let mut form = form_with_quote();

        let outcome = flow.execute(&mut form).await;
        assert_eq!(outcome, SwapOutcome::failed("Connect Wallet"));
        assert_eq!(agg.order_count(), 0);
    }

    #[tokio::test]
    async fn rejected_signature_is_reported() {
        let agg = Arc::new(MockAggregator::default());
        let flow = flow(agg.clone(), MockWallet::rejecting());
        let mut form = form_with_quote();

        match flow.execute(&mut form).await {
            SwapOutcome::Failed { reason, explorer_link } => {
                assert!(reason.contains("User rejected the request"));
                assert!(explorer_link.is_none());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(form.input_amount(), "1.5");
        assert!(agg.execute_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_quote_is_fetched_first() {
        let agg = Arc::new(MockAggregator::default());
        let flow = flow(agg.clone(), MockWallet::connected());
        let mut form = SwapForm::default();
        form.select_input(sol()).unwrap();
        form.select_output(usdc()).unwrap();
        form.set_input_amount("2");

        let outcome = flow.execute(&mut form).await;
        assert!(outcome.is_success());
        assert_eq!(agg.order_count(), 2);
    }

    #[tokio::test]
    async fn incomplete_form_fails_at_quoting() {
        let agg = Arc::new(MockAggregator::default());
        let flow = flow(agg.clone(), MockWallet::connected());
        let mut form = SwapForm::default();
        form.select_input(sol()).unwrap();

        let outcome = flow.execute(&mut form).await;
        assert_eq!(outcome, SwapOutcome::failed("Select Output Token"));
        assert_eq!(agg.order_count(), 0);
    }
}
