use std::fmt;
use std::path::{Path, PathBuf};

use ethers::signers::LocalWallet;
use serde::{Deserialize, Serialize};

use crate::cli::PrivateKey;
use crate::error::ConfigError;
use crate::types::ChainId;

/// Where the key for an account comes from. Configuration never holds the
/// key itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Hex encoded key in an environment variable (`.env` is loaded at start)
    Env { var: String },
    /// Hex encoded key in a file, relative to the config file
    File { path: PathBuf },
    /// Ask on the terminal
    Prompt,
}

/// Capability to produce a transaction signer for a chain.
pub trait CredentialProvider: fmt::Debug + Send + Sync {
    fn private_key(&self) -> Result<PrivateKey, ConfigError>;

    fn signer(&self, chain_id: ChainId) -> Result<LocalWallet, ConfigError> {
        Ok(self.private_key()?.wallet(chain_id))
    }
}

impl CredentialProvider for PrivateKey {
    fn private_key(&self) -> Result<PrivateKey, ConfigError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct EnvCredential {
    pub var: String,
}

impl CredentialProvider for EnvCredential {
    fn private_key(&self) -> Result<PrivateKey, ConfigError> {
        let value = std::env::var(&self.var)
            .map_err(|_| ConfigError::MissingEnv(self.var.clone()))?;

        value.parse().map_err(|err: ConfigError| {
            ConfigError::InvalidKey(format!("{}: {err}", self.var))
        })
    }
}

#[derive(Debug, Clone)]
pub struct FileCredential {
    pub path: PathBuf,
}

impl CredentialProvider for FileCredential {
    fn private_key(&self) -> Result<PrivateKey, ConfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            ConfigError::KeyFile {
                path: self.path.clone(),
                reason: err.to_string(),
            }
        })?;

        content.parse().map_err(|err: ConfigError| ConfigError::KeyFile {
            path: self.path.clone(),
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PromptCredential {
    pub label: String,
}

impl CredentialProvider for PromptCredential {
    fn private_key(&self) -> Result<PrivateKey, ConfigError> {
        let key = inquire::Password::new(&format!(
            "Private key for {}:",
            self.label
        ))
        .without_confirmation()
        .prompt()
        .map_err(|err| ConfigError::InvalidKey(err.to_string()))?;

        key.parse()
    }
}

impl CredentialSource {
    /// Builds the provider for this source. `root` is the directory key
    /// file paths are relative to, `label` names the account in prompts.
    pub fn provider(
        &self,
        root: &Path,
        label: impl ToString,
    ) -> Box<dyn CredentialProvider> {
        match self {
            CredentialSource::Env { var } => {
                Box::new(EnvCredential { var: var.clone() })
            }
            CredentialSource::File { path } => Box::new(FileCredential {
                path: if path.is_absolute() {
                    path.clone()
                } else {
                    root.join(path)
                },
            }),
            CredentialSource::Prompt => Box::new(PromptCredential {
                label: label.to_string(),
            }),
        }
    }
}
