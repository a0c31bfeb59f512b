use crate::Result;
use ledgerkit_config::HarnessSettings;
use ledgerkit_core::Provider;
use ledgerkit_harness::{Deployer, HistoryStore};
use ledgerkit_rpc_client::RpcClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// One harness run against a node: a provider built from the `[rpc]`
/// settings, a started history record and a deployer bound to every
/// account the node manages.
#[derive(Debug)]
pub struct Session {
    settings: HarnessSettings,
    provider: Arc<dyn Provider>,
    history: Arc<HistoryStore>,
    deployer: Deployer,
}

impl Session {
    /// Connects to `settings.rpc.url`. With the `telemetry` feature the
    /// global subscriber is installed first unless one already exists.
    pub async fn connect(settings: HarnessSettings) -> Result<Self> {
        settings.validate()?;

        #[cfg(feature = "telemetry")]
        if let Err(err) = ledgerkit_telemetry::init(&settings.telemetry) {
            tracing::debug!("keeping existing subscriber: {err}");
        }

        let provider: Arc<dyn Provider> = Arc::new(RpcClient::from_settings(&settings.rpc)?);
        Self::with_provider(settings, provider).await
    }

    /// Starts a session over an existing provider.
    pub async fn with_provider(
        settings: HarnessSettings,
        provider: Arc<dyn Provider>,
    ) -> Result<Self> {
        let history = Arc::new(HistoryStore::new());
        let record = history.init_history_record();
        let deployer =
            Deployer::from_network_accounts(Arc::clone(&provider), Arc::clone(&history), &settings)
                .await?;
        info!(
            record,
            identities = deployer.signers().len(),
            "harness session started"
        );
        Ok(Self {
            settings,
            provider,
            history,
            deployer,
        })
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn deployer(&self) -> &Deployer {
        &self.deployer
    }

    /// Writes the audit trail to `history.output_path` when configured.
    pub fn finish(&self) -> Result<Option<PathBuf>> {
        Ok(self.history.export(&self.settings.history)?)
    }
}
