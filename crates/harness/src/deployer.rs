//! Deploying compiled contracts and attaching to deployed ones.

use crate::confirmation::TransactionWatcher;
use crate::error::{DeploymentStage, HarnessError, HarnessResult};
use crate::history::HistoryStore;
use crate::receipt::{PendingTransaction, TransactionOverrides};
use crate::wrapper::ContractWrapper;
use ledgerkit_config::{ConfirmationSettings, HarnessSettings, TransactionDefaults};
use ledgerkit_core::{Address, ContractArtifact, Provider, Signer, Token, TransactionRequest};
use ledgerkit_wallets::ManagedAccount;
use std::sync::Arc;
use tracing::info;

/// Deploys contracts from a fixed set of identities. The first identity is
/// the default sender of every wrapper it produces.
#[derive(Debug)]
pub struct Deployer {
    provider: Arc<dyn Provider>,
    signers: Vec<Arc<dyn Signer>>,
    history: Arc<HistoryStore>,
    confirmation: ConfirmationSettings,
    defaults: TransactionDefaults,
    deployer_type: String,
}

impl Deployer {
    pub fn new(
        provider: Arc<dyn Provider>,
        signers: Vec<Arc<dyn Signer>>,
        history: Arc<HistoryStore>,
        settings: &HarnessSettings,
    ) -> HarnessResult<Self> {
        if signers.is_empty() {
            return Err(HarnessError::Usage(
                "A deployer needs at least one signing identity".to_string(),
            ));
        }
        Ok(Self {
            provider,
            signers,
            history,
            confirmation: settings.confirmation,
            defaults: settings.transactions,
            deployer_type: settings.history.deployer_type.clone(),
        })
    }

    /// Uses every account the node signs for, in the order it reports them.
    pub async fn from_network_accounts(
        provider: Arc<dyn Provider>,
        history: Arc<HistoryStore>,
        settings: &HarnessSettings,
    ) -> HarnessResult<Self> {
        let signers = provider
            .accounts()
            .await?
            .into_iter()
            .map(|address| Arc::new(ManagedAccount::new(address)) as Arc<dyn Signer>)
            .collect();
        Self::new(provider, signers, history, settings)
    }

    pub fn default_signer(&self) -> &Arc<dyn Signer> {
        &self.signers[0]
    }

    pub fn signers(&self) -> &[Arc<dyn Signer>] {
        &self.signers
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    fn watcher(&self, artifact: Arc<ContractArtifact>) -> Arc<TransactionWatcher> {
        Arc::new(TransactionWatcher::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.history),
            self.confirmation,
            self.deployer_type.clone(),
            artifact,
        ))
    }

    fn wrapper(&self, address: Address, watcher: Arc<TransactionWatcher>) -> ContractWrapper {
        ContractWrapper::new(
            address,
            Arc::clone(self.default_signer()),
            &self.signers,
            Arc::clone(&self.provider),
            watcher,
            self.defaults,
        )
    }

    /// Deploys `artifact` from the default identity and returns a wrapper
    /// bound to every identity. The deployment is recorded in the current
    /// history record under the contract name.
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        constructor_args: &[Token],
        overrides: TransactionOverrides,
    ) -> HarnessResult<ContractWrapper> {
        use DeploymentStage::*;

        if !artifact.is_deployable() {
            return Err(HarnessError::deployment(
                Encoding,
                HarnessError::Usage(format!("{} has no bytecode", artifact.contract_name)),
            ));
        }
        let data = artifact
            .abi
            .encode_deploy(&artifact.bytecode, constructor_args)
            .map_err(|err| HarnessError::deployment(Encoding, err.into()))?;

        let signer = self.default_signer();
        let from = signer.address();
        let tx = overrides.apply(TransactionRequest::deploy(data).sender(from), &self.defaults);
        let nonce = tx.nonce;
        let data = tx.data.clone();
        let hash = signer
            .sign_and_submit(tx, self.provider.as_ref())
            .await
            .map_err(|source| {
                HarnessError::deployment(Submission, HarnessError::Submission { source })
            })?;
        info!(contract = %artifact.contract_name, %from, %hash, "deployment submitted");

        let watcher = self.watcher(Arc::new(artifact.clone()));
        let pending = PendingTransaction {
            hash,
            from,
            to: None,
            nonce,
            data,
        };
        let receipt = watcher
            .wait(&pending, Some(&artifact.contract_name))
            .await
            .map_err(|err| {
                let stage = match err {
                    HarnessError::ExecutionFailed { .. } => Execution,
                    HarnessError::History(_) => Recording,
                    _ => Confirmation,
                };
                HarnessError::deployment(stage, err)
            })?;

        let address = receipt.contract_address.ok_or_else(|| {
            HarnessError::deployment(
                CodeCheck,
                HarnessError::Usage(format!("receipt of {hash} has no contract address")),
            )
        })?;
        let code = self
            .provider
            .get_code(&address)
            .await
            .map_err(|err| HarnessError::deployment(CodeCheck, err.into()))?;
        if code.is_empty() {
            return Err(HarnessError::deployment(CodeCheck, HarnessError::NoCode(address)));
        }

        info!(
            contract = %artifact.contract_name,
            %address,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "contract deployed"
        );
        Ok(self.wrapper(address, watcher))
    }

    /// Attaches to a contract already deployed at `address`. Sends nothing
    /// and records nothing.
    pub fn wrap_deployed_contract(
        &self,
        artifact: &ContractArtifact,
        address: Address,
    ) -> ContractWrapper {
        let watcher = self.watcher(Arc::new(artifact.clone()));
        self.wrapper(address, watcher)
    }
}
