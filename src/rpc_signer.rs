use std::sync::Arc;

use ethers::prelude::*;
use tracing::{info, instrument};

use crate::config::Network;
use crate::credentials::CredentialProvider;
use crate::error::ConfigError;
use crate::types::ChainId;

pub type Client<P = Http> = SignerMiddleware<Provider<P>, LocalWallet>;

#[derive(Debug, Clone)]
pub struct RpcSigner<P = Http> {
    pub client: Arc<Client<P>>,
    pub rpc_url: String,
}

impl RpcSigner<Http> {
    /// Connects to the network's node, checks the chain id against the
    /// profile and binds a signer from `credential` to it.
    #[instrument(name = "connect", skip_all, fields(network = %network.name))]
    pub async fn connect(
        network: &Network,
        credential: &dyn CredentialProvider,
    ) -> Result<Self, ConfigError> {
        let rpc_url = network.rpc_url()?;

        let provider = Provider::<Http>::try_from(rpc_url.as_str())
            .map_err(|err| ConfigError::Rpc {
                url: rpc_url.to_string(),
                reason: err.to_string(),
            })?
            .interval(network.profile.poll_interval());

        Self::with_provider(network, provider, credential).await
    }
}

impl<P> RpcSigner<P>
where
    P: JsonRpcClient + 'static,
{
    pub async fn with_provider(
        network: &Network,
        provider: Provider<P>,
        credential: &dyn CredentialProvider,
    ) -> Result<Self, ConfigError> {
        let rpc_url = network.profile.rpc_url.clone();

        let chain_id =
            provider
                .get_chainid()
                .await
                .map_err(|err| ConfigError::Rpc {
                    url: rpc_url.clone(),
                    reason: err.to_string(),
                })?;
        let chain_id = ChainId(chain_id.as_u64());

        if let Some(expected) = network.profile.chain_id {
            if expected != chain_id {
                return Err(ConfigError::ChainIdMismatch {
                    network: network.name.clone(),
                    expected,
                    actual: chain_id,
                });
            }
        }

        let wallet = credential.signer(chain_id)?;

        info!("Connected to chain {chain_id} as {:?}", wallet.address());

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            rpc_url,
        })
    }

    pub fn address(&self) -> Address {
        self.client.address()
    }

    pub fn chain_id(&self) -> ChainId {
        ChainId(self.client.signer().chain_id())
    }

    pub async fn pending_nonce(&self) -> Result<u64, ConfigError> {
        let nonce = self
            .client
            .get_transaction_count(
                self.address(),
                Some(BlockNumber::Pending.into()),
            )
            .await
            .map_err(|err| ConfigError::Rpc {
                url: self.rpc_url.clone(),
                reason: err.to_string(),
            })?;

        Ok(nonce.as_u64())
    }
}
