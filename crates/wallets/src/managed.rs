use async_trait::async_trait;
use ledgerkit_core::{Address, Provider, Signer, SignerError, TransactionRequest, TxHash};
use tracing::debug;

/// An account whose key is held by the node.
///
/// Transactions go out unsigned through `eth_sendTransaction` and the node
/// signs them with its own copy of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedAccount {
    address: Address,
}

impl ManagedAccount {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

#[async_trait]
impl Signer for ManagedAccount {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_and_submit(
        &self,
        tx: TransactionRequest,
        provider: &dyn Provider,
    ) -> Result<TxHash, SignerError> {
        if let Some(from) = tx.from {
            if from != self.address {
                return Err(SignerError::SenderMismatch {
                    requested: from,
                    signer: self.address,
                });
            }
        }
        debug!(from = %self.address, "submitting node-signed transaction");
        Ok(provider.send_transaction(&tx.sender(self.address)).await?)
    }
}
