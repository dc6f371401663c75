use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ethers::providers::{Http, JsonRpcClient};
use ethers::types::Bytes;

use crate::config::{Config, Network};
use crate::credentials::CredentialProvider;
use crate::error::ConfigError;
use crate::ethers_utils::ContractCreate;
use crate::forge_utils::ContractSpec;
use crate::rpc_signer::RpcSigner;
use crate::types::{ChainId, Confirmations};

#[derive(Debug)]
pub struct DeploymentContext<P = Http> {
    pub network: Network,
    pub chain_id: ChainId,
    pub rpc_signer: RpcSigner<P>,
    pub nonce: AtomicU64,
    pub confirmations: Confirmations,
    pub confirmation_timeout: Duration,
}

impl DeploymentContext<Http> {
    pub async fn connect(
        config: &Config,
        network: &Network,
        credential: &dyn CredentialProvider,
    ) -> Result<Self, ConfigError> {
        let rpc_signer = RpcSigner::connect(network, credential).await?;

        Self::with_signer(config, network, rpc_signer).await
    }
}

impl<P> DeploymentContext<P>
where
    P: JsonRpcClient + 'static,
{
    pub async fn with_signer(
        config: &Config,
        network: &Network,
        rpc_signer: RpcSigner<P>,
    ) -> Result<Self, ConfigError> {
        let nonce = rpc_signer.pending_nonce().await?;

        Ok(Self {
            network: network.clone(),
            chain_id: rpc_signer.chain_id(),
            rpc_signer,
            nonce: AtomicU64::new(nonce),
            confirmations: config.confirmations,
            confirmation_timeout: config.confirmation_timeout(),
        })
    }

    pub fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Re-reads the pending nonce, needed once transactions were sent
    /// through the signer outside of `contract_create`.
    pub async fn resync_nonce(&self) -> Result<(), ConfigError> {
        let nonce = self.rpc_signer.pending_nonce().await?;
        self.nonce.store(nonce, Ordering::SeqCst);

        Ok(())
    }

    pub fn contract_create(
        &self,
        contract_spec: ContractSpec,
        code: Bytes,
    ) -> ContractCreate {
        ContractCreate::new(contract_spec, code, self.next_nonce())
            .with_legacy(self.network.profile.legacy)
            .with_confirmations(self.confirmations.0)
            .with_timeout(self.confirmation_timeout)
            .with_poll_interval(self.network.profile.poll_interval())
    }
}
