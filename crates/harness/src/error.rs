use crate::history::HistoryError;
use crate::receipt::Receipt;
use ledgerkit_core::{AbiError, Address, ProviderError, SignerError, TxHash};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Step of a deployment that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStage {
    Encoding,
    Submission,
    Confirmation,
    /// The constructor ran and reverted.
    Execution,
    /// Included on chain, but the action could not be recorded.
    Recording,
    /// No code was found at the assigned address.
    CodeCheck,
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentStage::Encoding => "encoding",
            DeploymentStage::Submission => "submission",
            DeploymentStage::Confirmation => "confirmation",
            DeploymentStage::Execution => "execution",
            DeploymentStage::Recording => "recording",
            DeploymentStage::CodeCheck => "code check",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by wrappers, the deployer and the history store.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Invalid selector, index out of range, unknown entry point or bad
    /// arguments. Raised before any network interaction.
    #[error("{0}")]
    Usage(String),

    /// The address is neither bound nor an account the network signs for.
    #[error("Address {0} cannot be resolved to a signing identity")]
    Resolution(Address),

    /// The network rejected the transaction before inclusion.
    #[error("Transaction submission failed: {source}")]
    Submission { source: SignerError },

    /// Polling for the receipt failed.
    #[error("Confirmation of {hash} failed: {source}")]
    Confirmation { hash: TxHash, source: ProviderError },

    #[error("Transaction {hash} not confirmed after {polls} polls ({elapsed:?})")]
    ConfirmationTimeout {
        hash: TxHash,
        polls: u32,
        elapsed: Duration,
    },

    /// Included, but execution reported failure. The action is recorded.
    #[error("Transaction {} was included in block {} but execution failed", .receipt.transaction_hash, .receipt.block_number)]
    ExecutionFailed { receipt: Box<Receipt> },

    #[error("Deployment failed at {stage}: {source}")]
    Deployment {
        stage: DeploymentStage,
        source: Box<HarnessError>,
    },

    #[error("No code at contract address {0}")]
    NoCode(Address),

    /// A read-only query failed.
    #[error(transparent)]
    Network(#[from] ProviderError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

impl From<AbiError> for HarnessError {
    fn from(err: AbiError) -> Self {
        HarnessError::Usage(err.to_string())
    }
}

impl HarnessError {
    pub(crate) fn deployment(stage: DeploymentStage, source: HarnessError) -> Self {
        HarnessError::Deployment {
            stage,
            source: Box::new(source),
        }
    }

    /// The receipt of an included transaction, if this error carries one.
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            HarnessError::ExecutionFailed { receipt } => Some(receipt.as_ref()),
            HarnessError::Deployment { source, .. } => source.receipt(),
            _ => None,
        }
    }

    /// True when the transaction may still be pending on the network.
    pub fn is_timeout(&self) -> bool {
        match self {
            HarnessError::ConfirmationTimeout { .. } => true,
            HarnessError::Deployment { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
