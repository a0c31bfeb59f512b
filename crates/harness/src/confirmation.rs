//! Driving submitted transactions to inclusion.

use crate::error::{HarnessError, HarnessResult};
use crate::history::{Action, HistoryStore};
use crate::receipt::{PendingTransaction, Receipt};
use chrono::Utc;
use ledgerkit_config::ConfirmationSettings;
use ledgerkit_core::{ContractArtifact, Provider, TransactionReceipt, TxHash};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

/// Polls for receipts and records each confirmed transaction once.
///
/// Outcomes are memoized per hash in the [`HistoryStore`], so they are
/// shared with every other watcher recording into the same store: waiting
/// again on a confirmed transaction returns the stored receipt, and
/// concurrent waits on one hash share a single polling loop. Failed waits
/// (network error, timeout) are not memoized and may be retried.
#[derive(Debug)]
pub struct TransactionWatcher {
    provider: Arc<dyn Provider>,
    history: Arc<HistoryStore>,
    settings: ConfirmationSettings,
    deployer_type: String,
    artifact: Arc<ContractArtifact>,
}

impl TransactionWatcher {
    pub fn new(
        provider: Arc<dyn Provider>,
        history: Arc<HistoryStore>,
        settings: ConfirmationSettings,
        deployer_type: impl Into<String>,
        artifact: Arc<ContractArtifact>,
    ) -> Self {
        Self {
            provider,
            history,
            settings,
            deployer_type: deployer_type.into(),
            artifact,
        }
    }

    pub fn deployer_type(&self) -> &str {
        &self.deployer_type
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn settings(&self) -> &ConfirmationSettings {
        &self.settings
    }

    pub fn artifact(&self) -> &Arc<ContractArtifact> {
        &self.artifact
    }

    /// Waits for `pending` and records an action labelled `label`, or the
    /// deployer type when no label is given.
    pub async fn wait(
        &self,
        pending: &PendingTransaction,
        label: Option<&str>,
    ) -> HarnessResult<Receipt> {
        let cell = self.history.confirmation_slot(pending.hash);
        let receipt = cell
            .get_or_try_init(|| self.confirm(pending, label))
            .await?
            .clone();

        if receipt.is_success() {
            Ok(receipt)
        } else {
            Err(HarnessError::ExecutionFailed {
                receipt: Box::new(receipt),
            })
        }
    }

    async fn confirm(
        &self,
        pending: &PendingTransaction,
        label: Option<&str>,
    ) -> HarnessResult<Receipt> {
        let raw = self.poll_receipt(&pending.hash).await?;
        let receipt = Receipt::new(raw, &self.artifact.abi);

        let action = Action {
            deployer_type: self.deployer_type.clone(),
            name_or_label: label.unwrap_or(&self.deployer_type).to_string(),
            transaction_hash: receipt.transaction_hash,
            status: receipt.status.code(),
            gas_used: receipt.gas_used,
            block_number: receipt.block_number,
            recorded_at: Utc::now(),
        };
        if !receipt.is_success() {
            warn!(
                hash = %receipt.transaction_hash,
                block = receipt.block_number,
                label = %action.name_or_label,
                "transaction included but execution failed"
            );
        }
        self.history.append(action)?;
        Ok(receipt)
    }

    /// Bounded by both `max_polls` and `timeout`; exhausting either is
    /// reported as [`HarnessError::ConfirmationTimeout`].
    async fn poll_receipt(&self, hash: &TxHash) -> HarnessResult<TransactionReceipt> {
        let started = Instant::now();
        let budget = self.settings.timeout();
        let mut polls = 0u32;

        loop {
            let remaining = budget.saturating_sub(started.elapsed());
            polls += 1;
            match timeout(remaining, self.provider.get_transaction_receipt(hash)).await {
                Ok(Ok(Some(receipt))) => {
                    debug!(%hash, polls, block = receipt.block_number, "transaction included");
                    return Ok(receipt);
                }
                Ok(Ok(None)) => {}
                Ok(Err(source)) => {
                    return Err(HarnessError::Confirmation {
                        hash: *hash,
                        source,
                    })
                }
                // the receipt query itself outlived the budget
                Err(_) => {}
            }

            let elapsed = started.elapsed();
            if polls >= self.settings.max_polls || elapsed >= budget {
                return Err(HarnessError::ConfirmationTimeout {
                    hash: *hash,
                    polls,
                    elapsed,
                });
            }
            debug!(%hash, polls, "receipt not available yet");
            sleep(self.settings.poll_interval().min(budget - elapsed)).await;
        }
    }
}
