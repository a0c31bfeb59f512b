use crate::key_pair::KeyPair;
use crate::legacy::LegacyTransaction;
use crate::WalletResult;
use async_trait::async_trait;
use ledgerkit_core::{Address, Provider, Signer, SignerError, TransactionRequest, TxHash};
use std::fmt;
use tokio::sync::Mutex;
use tracing::debug;

/// A signer holding its private key locally.
///
/// Fills any missing nonce, gas price and gas limit from the network, signs
/// a legacy EIP-155 transaction and submits the raw bytes. Submissions from
/// one wallet are serialized so concurrent sends get consecutive nonces.
pub struct Wallet {
    key_pair: KeyPair,
    submit_lock: Mutex<()>,
}

impl Wallet {
    pub fn new(key_pair: KeyPair) -> Self {
        Self {
            key_pair,
            submit_lock: Mutex::new(()),
        }
    }

    /// A wallet with a freshly generated key.
    pub fn random() -> WalletResult<Self> {
        Ok(Self::new(KeyPair::generate()?))
    }

    pub fn from_hex(private_key: &str) -> WalletResult<Self> {
        Ok(Self::new(KeyPair::from_hex(private_key)?))
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Fills unset fields and signs, returning the raw transaction.
    pub async fn sign_transaction(
        &self,
        tx: &TransactionRequest,
        provider: &dyn Provider,
    ) -> Result<Vec<u8>, SignerError> {
        let address = self.key_pair.address();
        let nonce = match tx.nonce {
            Some(nonce) => nonce,
            None => provider.transaction_count(&address).await?,
        };
        let gas_price = match &tx.gas_price {
            Some(price) => price.clone(),
            None => provider.gas_price().await?,
        };
        let gas = match tx.gas {
            Some(gas) => gas,
            None => {
                let estimate = tx.clone().sender(address);
                provider.estimate_gas(&estimate).await?
            }
        };
        let chain_id = provider.chain_id().await?;

        let legacy = LegacyTransaction {
            nonce,
            gas_price,
            gas,
            to: tx.to,
            value: tx.value.clone().unwrap_or_default(),
            data: tx.data.clone(),
            chain_id,
        };
        debug!(from = %address, nonce, chain_id, "signing transaction");
        Ok(legacy.sign(&self.key_pair)?)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.key_pair.address())
            .finish()
    }
}

#[async_trait]
impl Signer for Wallet {
    fn address(&self) -> Address {
        self.key_pair.address()
    }

    async fn sign_and_submit(
        &self,
        tx: TransactionRequest,
        provider: &dyn Provider,
    ) -> Result<TxHash, SignerError> {
        let address = self.address();
        if let Some(from) = tx.from {
            if from != address {
                return Err(SignerError::SenderMismatch {
                    requested: from,
                    signer: address,
                });
            }
        }

        let _guard = self.submit_lock.lock().await;
        let raw = self.sign_transaction(&tx, provider).await?;
        Ok(provider.send_raw_transaction(&raw).await?)
    }
}
