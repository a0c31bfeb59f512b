//! Deployed contract handles bound to signing identities.

use crate::confirmation::TransactionWatcher;
use crate::error::{HarnessError, HarnessResult};
use crate::history::HistoryStore;
use crate::receipt::{PendingTransaction, Receipt, TransactionOverrides};
use crate::sender::{IntoSender, Sender};
use dashmap::DashMap;
use ledgerkit_config::TransactionDefaults;
use ledgerkit_core::{
    Address, Bytes, ContractArtifact, Provider, Signer, Token, TransactionRequest,
};
use ledgerkit_wallets::ManagedAccount;
use std::sync::Arc;
use tracing::{debug, info};

/// A contract as seen by one identity.
#[derive(Debug)]
pub struct BoundContract {
    address: Address,
    artifact: Arc<ContractArtifact>,
    signer: Arc<dyn Signer>,
    provider: Arc<dyn Provider>,
    watcher: Arc<TransactionWatcher>,
    defaults: TransactionDefaults,
}

impl BoundContract {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    /// Address of the identity this context sends as.
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Encodes a call to `method` and submits it as the bound identity.
    pub async fn send(
        &self,
        method: &str,
        args: &[Token],
        overrides: TransactionOverrides,
    ) -> HarnessResult<PendingTransaction> {
        let data = self.artifact.abi.encode_call(method, args)?;
        let from = self.signer.address();
        let tx = overrides.apply(
            TransactionRequest::call(self.address, data).sender(from),
            &self.defaults,
        );
        let nonce = tx.nonce;
        let data = tx.data.clone();

        let hash = self
            .signer
            .sign_and_submit(tx, self.provider.as_ref())
            .await
            .map_err(|source| HarnessError::Submission { source })?;
        info!(contract = %self.address, %from, method, %hash, "transaction submitted");

        Ok(PendingTransaction {
            hash,
            from,
            to: Some(self.address),
            nonce,
            data,
        })
    }

    /// Executes `method` read-only and returns the raw return data.
    pub async fn call(&self, method: &str, args: &[Token]) -> HarnessResult<Bytes> {
        let data = self.artifact.abi.encode_call(method, args)?;
        let tx = TransactionRequest::call(self.address, data).sender(self.signer.address());
        Ok(self.provider.call(&tx).await?)
    }

    pub async fn send_and_wait(
        &self,
        method: &str,
        args: &[Token],
        overrides: TransactionOverrides,
        label: Option<&str>,
    ) -> HarnessResult<Receipt> {
        let pending = self.send(method, args, overrides).await?;
        self.watcher.wait(&pending, label).await
    }
}

/// A deployed contract with one calling context per known identity.
///
/// Contexts for identities that were not bound up front are created on
/// first use by [`ContractWrapper::from`] and cached by address.
#[derive(Debug)]
pub struct ContractWrapper {
    address: Address,
    artifact: Arc<ContractArtifact>,
    default_signer: Arc<dyn Signer>,
    provider: Arc<dyn Provider>,
    watcher: Arc<TransactionWatcher>,
    defaults: TransactionDefaults,
    default_instance: Arc<BoundContract>,
    bound_instances: Vec<Arc<BoundContract>>,
    instances_by_address: DashMap<Address, Arc<BoundContract>>,
}

impl ContractWrapper {
    /// Binds `signers` in order; the default signer is bound as well and
    /// shares its context with an equal entry of `signers`.
    pub(crate) fn new(
        address: Address,
        default_signer: Arc<dyn Signer>,
        signers: &[Arc<dyn Signer>],
        provider: Arc<dyn Provider>,
        watcher: Arc<TransactionWatcher>,
        defaults: TransactionDefaults,
    ) -> Self {
        let artifact = Arc::clone(watcher.artifact());
        let bind = |signer: &Arc<dyn Signer>| {
            Arc::new(BoundContract {
                address,
                artifact: Arc::clone(&artifact),
                signer: Arc::clone(signer),
                provider: Arc::clone(&provider),
                watcher: Arc::clone(&watcher),
                defaults,
            })
        };

        let instances_by_address = DashMap::new();
        let bound_instances: Vec<_> = signers
            .iter()
            .map(|signer| {
                Arc::clone(
                    instances_by_address
                        .entry(signer.address())
                        .or_insert_with(|| bind(signer))
                        .value(),
                )
            })
            .collect();
        let default_instance = Arc::clone(
            instances_by_address
                .entry(default_signer.address())
                .or_insert_with(|| bind(&default_signer))
                .value(),
        );

        Self {
            address,
            artifact,
            default_signer,
            provider,
            watcher,
            defaults,
            default_instance,
            bound_instances,
            instances_by_address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    pub fn default_signer(&self) -> &Arc<dyn Signer> {
        &self.default_signer
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Kind recorded on every action this wrapper appends.
    pub fn deployer_type(&self) -> &str {
        self.watcher.deployer_type()
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        self.watcher.history()
    }

    /// Contexts bound at construction, in signer order.
    pub fn instances(&self) -> &[Arc<BoundContract>] {
        &self.bound_instances
    }

    /// Every cached context keyed by signer address.
    pub fn instances_by_address(&self) -> &DashMap<Address, Arc<BoundContract>> {
        &self.instances_by_address
    }

    /// Returns the calling context for `selector`; `None` selects the
    /// default signer. Never changes the default signer.
    pub async fn from<S: IntoSender>(&self, selector: S) -> HarnessResult<Arc<BoundContract>> {
        match selector.into_sender()? {
            None => Ok(Arc::clone(&self.default_instance)),
            Some(sender) => self.resolve(sender).await,
        }
    }

    async fn resolve(&self, sender: Sender) -> HarnessResult<Arc<BoundContract>> {
        match sender {
            Sender::Index(index) => self.bound_instances.get(index).cloned().ok_or_else(|| {
                HarnessError::Usage(format!(
                    "Signer index {index} is out of range ({} identities bound)",
                    self.bound_instances.len()
                ))
            }),
            Sender::Address(address) => {
                let cached = self
                    .instances_by_address
                    .get(&address)
                    .map(|entry| Arc::clone(entry.value()));
                if let Some(instance) = cached {
                    return Ok(instance);
                }

                let accounts = self.provider.accounts().await?;
                if !accounts.contains(&address) {
                    return Err(HarnessError::Resolution(address));
                }
                debug!(%address, "binding node-managed account");
                let signer: Arc<dyn Signer> = Arc::new(ManagedAccount::new(address));
                Ok(self.bind_cached(signer))
            }
            Sender::Identity(signer) => Ok(self.bind_cached(signer)),
        }
    }

    fn bind_cached(&self, signer: Arc<dyn Signer>) -> Arc<BoundContract> {
        let address = signer.address();
        let entry = self.instances_by_address.entry(address).or_insert_with(|| {
            debug!(%address, contract = %self.address, "caching new calling context");
            Arc::new(BoundContract {
                address: self.address,
                artifact: Arc::clone(&self.artifact),
                signer,
                provider: Arc::clone(&self.provider),
                watcher: Arc::clone(&self.watcher),
                defaults: self.defaults,
            })
        });
        Arc::clone(entry.value())
    }

    pub async fn send(
        &self,
        method: &str,
        args: &[Token],
        overrides: TransactionOverrides,
    ) -> HarnessResult<PendingTransaction> {
        self.default_instance.send(method, args, overrides).await
    }

    pub async fn call(&self, method: &str, args: &[Token]) -> HarnessResult<Bytes> {
        self.default_instance.call(method, args).await
    }

    pub async fn send_and_wait(
        &self,
        method: &str,
        args: &[Token],
        overrides: TransactionOverrides,
        label: Option<&str>,
    ) -> HarnessResult<Receipt> {
        self.default_instance
            .send_and_wait(method, args, overrides, label)
            .await
    }

    /// Waits for `pending` to be included and records it in the current
    /// history record under `label`, or under [`Self::deployer_type`] when
    /// no label is given.
    ///
    /// A transaction that was included but failed is recorded with a
    /// non-zero status and returned as [`HarnessError::ExecutionFailed`].
    pub async fn verbose_wait_for_transaction(
        &self,
        pending: &PendingTransaction,
        label: Option<&str>,
    ) -> HarnessResult<Receipt> {
        self.watcher.wait(pending, label).await
    }
}
