use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::credentials::CredentialSource;
use crate::error::ConfigError;
use crate::serde_utils;
use crate::types::{ChainId, Confirmations, OptimizerRuns};

pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const DEFAULT_OUTPUT_PATH: &str = "scripts/contractAddress.js";
pub const DEFAULT_EXPORT_NAME: &str = "contractAddress";
pub const DEFAULT_REPORT_DIR: &str = "deployments";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_network: Option<String>,
    pub networks: BTreeMap<String, NetworkProfile>,
    pub compiler: CompilerProfile,
    pub contract: ContractTarget,
    #[serde(default)]
    pub output: OutputTarget,
    #[serde(default = "default_confirmations")]
    pub confirmations: Confirmations,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Directory relative paths in the file are resolved against
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NetworkProfile {
    pub rpc_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default)]
    pub accounts: Vec<CredentialSource>,
    /// Send legacy (pre EIP-1559) transactions
    #[serde(default)]
    pub legacy: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawCompilerProfile")]
pub struct CompilerProfile {
    pub version: String,
    pub optimizer: OptimizerSettings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptimizerSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_optimizer_runs")]
    pub runs: OptimizerRuns,
}

/// Accepts both `compiler: 0.8.19` and the expanded form with optimizer
/// settings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCompilerProfile {
    Version(String),
    Full {
        version: String,
        #[serde(default)]
        optimizer: OptimizerSettings,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContractTarget {
    pub name: String,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OutputTarget {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default = "default_export_name")]
    pub export_name: String,
}

/// A network profile selected by name for the current run.
#[derive(Debug, Clone)]
pub struct Network {
    pub name: String,
    pub profile: NetworkProfile,
}

fn default_confirmations() -> Confirmations {
    Confirmations(1)
}

fn default_confirmation_timeout_secs() -> u64 {
    300
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_DIR)
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_optimizer_runs() -> OptimizerRuns {
    OptimizerRuns(200)
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACTS_DIR)
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_export_name() -> String {
    DEFAULT_EXPORT_NAME.to_string()
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: default_optimizer_runs(),
        }
    }
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            export_name: default_export_name(),
        }
    }
}

impl From<RawCompilerProfile> for CompilerProfile {
    fn from(raw: RawCompilerProfile) -> Self {
        match raw {
            RawCompilerProfile::Version(version) => Self {
                version,
                optimizer: OptimizerSettings::default(),
            },
            RawCompilerProfile::Full { version, optimizer } => {
                Self { version, optimizer }
            }
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config: Config = serde_utils::read_deserialize(path)
            .await
            .map_err(|err| ConfigError::Read {
                path: path.to_owned(),
                reason: format!("{err:#}"),
            })?;

        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.networks.is_empty() {
            return Err(ConfigError::Invalid("no networks configured".into()));
        }

        if let Some(default_network) = self.default_network.as_deref() {
            self.network(Some(default_network))?;
        }

        for (name, profile) in &self.networks {
            profile.parsed_rpc_url().map_err(|reason| {
                ConfigError::Invalid(format!("network '{name}': {reason}"))
            })?;
        }

        if self.contract.name.trim().is_empty() {
            return Err(ConfigError::Invalid("contract.name is empty".into()));
        }

        if !is_valid_identifier(&self.output.export_name) {
            return Err(ConfigError::Invalid(format!(
                "output.export_name '{}' is not a valid identifier",
                self.output.export_name
            )));
        }

        if !is_valid_compiler_version(&self.compiler.version) {
            return Err(ConfigError::Invalid(format!(
                "compiler.version '{}' is not of the form MAJOR.MINOR.PATCH",
                self.compiler.version
            )));
        }

        if self.confirmations.0 == 0 {
            return Err(ConfigError::Invalid(
                "confirmations must be at least 1".into(),
            ));
        }

        if self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "confirmation_timeout_secs must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Resolves the network to use for this run: the explicit name, else
    /// `default_network`, else the only configured network.
    pub fn network(&self, name: Option<&str>) -> Result<Network, ConfigError> {
        let name = match name.or(self.default_network.as_deref()) {
            Some(name) => name.to_string(),
            None if self.networks.len() == 1 => {
                self.networks.keys().next().cloned().unwrap_or_default()
            }
            None => {
                return Err(ConfigError::Invalid(
                    "no network selected and no default_network configured"
                        .into(),
                ))
            }
        };

        let profile = self.networks.get(&name).cloned().ok_or_else(|| {
            ConfigError::UnknownNetwork {
                name: name.clone(),
                available: self
                    .networks
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })?;

        Ok(Network { name, profile })
    }

    pub fn project_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();

        if path.is_absolute() {
            path.to_owned()
        } else {
            self.root.join(path)
        }
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

impl NetworkProfile {
    pub fn parsed_rpc_url(&self) -> Result<Url, String> {
        self.rpc_url.parse().map_err(|err| format!("rpc_url: {err}"))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Network {
    pub fn rpc_url(&self) -> Result<Url, ConfigError> {
        self.profile
            .parsed_rpc_url()
            .map_err(|reason| ConfigError::Rpc {
                url: self.profile.rpc_url.clone(),
                reason,
            })
    }

    /// Whether transactions on this network cost nothing real
    pub fn is_local(&self) -> bool {
        let Ok(url) = self.rpc_url() else {
            return false;
        };

        matches!(
            url.host_str(),
            Some("localhost" | "127.0.0.1" | "[::1]" | "::1" | "0.0.0.0")
        )
    }
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();

    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_valid_compiler_version(s: &str) -> bool {
    let parts: Vec<_> = s.split('.').collect();

    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.parse::<u32>().is_ok())
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    const INSURANCE: &str = indoc! {r#"
        default_network: hardhat
        networks:
          hardhat:
            rpc_url: http://127.0.0.1:8545
            chain_id: 1337
            accounts:
              - source: env
                var: HARDHAT_PRIVATE_KEY
          mumbai:
            rpc_url: https://rpc-mumbai.maticvigil.com
            chain_id: 80001
            accounts:
              - source: env
                var: MUMBAI_PRIVATE_KEY
              - source: file
                path: keys/second.key
        compiler:
          version: 0.8.20
          optimizer:
            enabled: true
            runs: 200
        contract:
          name: InsuranceFactory
        output:
          path: scripts/contractAddress.js
          export_name: factoryAddress
    "#};

    fn parse(content: &str) -> eyre::Result<Config> {
        let config: Config =
            serde_utils::deserialize_str(Path::new("deployer.yml"), content)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn parses_full_config() -> eyre::Result<()> {
        let config = parse(INSURANCE)?;

        assert_eq!(config.compiler.version, "0.8.20");
        assert!(config.compiler.optimizer.enabled);
        assert_eq!(config.compiler.optimizer.runs, OptimizerRuns(200));
        assert_eq!(config.contract.name, "InsuranceFactory");
        assert_eq!(config.contract.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(config.output.export_name, "factoryAddress");
        assert_eq!(config.confirmations, Confirmations(1));
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(300));

        let mumbai = &config.networks["mumbai"];
        assert_eq!(mumbai.chain_id, Some(ChainId(80001)));
        assert_eq!(
            mumbai.accounts,
            vec![
                CredentialSource::Env {
                    var: "MUMBAI_PRIVATE_KEY".into()
                },
                CredentialSource::File {
                    path: "keys/second.key".into()
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn compiler_shorthand() -> eyre::Result<()> {
        let config = parse(indoc! {r#"
            networks:
              mumbai:
                rpc_url: https://rpc-mumbai.maticvigil.com
            compiler: 0.8.19
            contract:
              name: TokenVesting
        "#})?;

        assert_eq!(config.compiler.version, "0.8.19");
        assert_eq!(config.compiler.optimizer, OptimizerSettings::default());
        assert_eq!(config.output, OutputTarget::default());

        Ok(())
    }

    #[test]
    fn parses_toml() -> eyre::Result<()> {
        let config: Config = serde_utils::deserialize_str(
            Path::new("deployer.toml"),
            indoc! {r#"
                default_network = "localhost"

                [networks.localhost]
                rpc_url = "http://localhost:8545"
                accounts = [{ source = "prompt" }]

                [compiler]
                version = "0.8.20"

                [contract]
                name = "StorageVictimAudited"
            "#},
        )?;
        config.validate()?;

        assert_eq!(
            config.networks["localhost"].accounts,
            vec![CredentialSource::Prompt]
        );

        Ok(())
    }

    #[test]
    fn rejects_literal_keys() {
        let result = parse(indoc! {r#"
            networks:
              mumbai:
                rpc_url: https://rpc-mumbai.maticvigil.com
                accounts:
                  - "9673488150c05380c2d245a4b7926252132489ecc9f19fd3513e926993cce2d1"
            compiler: 0.8.20
            contract:
              name: InsuranceFactory
        "#});

        assert!(result.is_err());
    }

    #[test]
    fn network_selection() -> eyre::Result<()> {
        let config = parse(INSURANCE)?;

        assert_eq!(config.network(None)?.name, "hardhat");
        assert_eq!(config.network(Some("mumbai"))?.name, "mumbai");

        let err = config.network(Some("goerli")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownNetwork { ref name, ref available }
                if name == "goerli" && available == "hardhat, mumbai"
        ));

        Ok(())
    }

    #[test]
    fn ambiguous_network_without_default() -> eyre::Result<()> {
        let mut config = parse(INSURANCE)?;
        config.default_network = None;

        assert!(matches!(config.network(None), Err(ConfigError::Invalid(_))));

        config.networks.remove("mumbai");
        assert_eq!(config.network(None)?.name, "hardhat");

        Ok(())
    }

    #[test]
    fn local_networks() -> eyre::Result<()> {
        let config = parse(INSURANCE)?;

        assert!(config.network(Some("hardhat"))?.is_local());
        assert!(!config.network(Some("mumbai"))?.is_local());

        Ok(())
    }

    #[test]
    fn validation_errors() -> eyre::Result<()> {
        let valid = parse(INSURANCE)?;

        let mut config = valid.clone();
        config.output.export_name = "factory-address".into();
        assert!(config.validate().is_err());

        let mut config = valid.clone();
        config.compiler.version = "^0.8.0".into();
        assert!(config.validate().is_err());

        let mut config = valid.clone();
        config.confirmations = Confirmations(0);
        assert!(config.validate().is_err());

        let mut config = valid.clone();
        config.default_network = Some("goerli".into());
        assert!(config.validate().is_err());

        let mut config = valid;
        if let Some(network) = config.networks.get_mut("mumbai") {
            network.rpc_url = "not a url".into();
        }
        assert!(config.validate().is_err());

        Ok(())
    }

    #[test]
    fn project_paths_are_relative_to_config() -> eyre::Result<()> {
        let mut config = parse(INSURANCE)?;
        config.root = PathBuf::from("projects/insurance");

        assert_eq!(
            config.project_path(&config.output.path),
            PathBuf::from("projects/insurance/scripts/contractAddress.js")
        );
        assert_eq!(
            config.project_path("/tmp/address.js"),
            PathBuf::from("/tmp/address.js")
        );

        Ok(())
    }

    #[tokio::test]
    async fn written_config_loads_back() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("deployer.yml");

        let config = Config {
            default_network: None,
            networks: maplit::btreemap! {
                "localhost".to_string() => NetworkProfile {
                    rpc_url: "http://localhost:8545/".into(),
                    chain_id: Some(ChainId(1337)),
                    accounts: vec![CredentialSource::Prompt],
                    legacy: false,
                    poll_interval_ms: 1000,
                },
            },
            compiler: CompilerProfile {
                version: "0.8.19".into(),
                optimizer: OptimizerSettings {
                    enabled: true,
                    runs: OptimizerRuns(1000),
                },
            },
            contract: ContractTarget {
                name: "StorageVictimAudited".into(),
                artifacts_dir: DEFAULT_ARTIFACTS_DIR.into(),
                constructor_args: vec![],
            },
            output: OutputTarget::default(),
            confirmations: Confirmations(1),
            confirmation_timeout_secs: 300,
            report_dir: DEFAULT_REPORT_DIR.into(),
            root: PathBuf::new(),
        };

        serde_utils::write_serialize(&path, &config).await?;
        let loaded = Config::load(&path).await?;

        assert_eq!(loaded.networks, config.networks);
        assert_eq!(loaded.compiler, config.compiler);
        assert_eq!(loaded.contract, config.contract);
        assert_eq!(loaded.root, dir.path());

        Ok(())
    }
}
