use std::path::PathBuf;
use std::time::Duration;

use ethers::types::{Address, H256};
use thiserror::Error;

use crate::types::ChainId;

/// Anything wrong with the inputs of a run, detected before or while
/// talking to the network but before a transaction is submitted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("unknown network '{name}' (available: {available})")]
    UnknownNetwork { name: String, available: String },

    #[error("network '{0}' has no accounts configured")]
    NoAccounts(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    #[error("failed to read key file {}: {reason}", path.display())]
    KeyFile { path: PathBuf, reason: String },

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("failed to connect to {url}: {reason}")]
    Rpc { url: String, reason: String },

    #[error("network '{network}' expects chain id {expected} but the node reports {actual}")]
    ChainIdMismatch {
        network: String,
        expected: ChainId,
        actual: ChainId,
    },

    #[error("artifact for {contract}: {reason}")]
    Artifact { contract: String, reason: String },

    #[error("constructor arguments for {contract}: {reason}")]
    ConstructorArgs { contract: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("creation transaction for {contract} was rejected: {reason}")]
    Rejected { contract: String, reason: String },

    #[error("creation transaction {tx_hash:?} for {contract} reverted")]
    Reverted { contract: String, tx_hash: H256 },

    #[error("creation transaction {tx_hash:?} for {contract} failed: {reason}")]
    Dropped {
        contract: String,
        tx_hash: H256,
        reason: String,
    },

    #[error("creation transaction {tx_hash:?} not confirmed within {timeout:?}")]
    ConfirmationTimeout { tx_hash: H256, timeout: Duration },

    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    pub fn address_mismatch(
        contract: impl ToString,
        tx_hash: H256,
        expected: Address,
        actual: Address,
    ) -> Self {
        Self::Dropped {
            contract: contract.to_string(),
            tx_hash,
            reason: format!(
                "receipt reports address {actual:?}, expected {expected:?}"
            ),
        }
    }
}
