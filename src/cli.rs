use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod private_key;

pub use private_key::PrivateKey;

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case", version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Deploy the configured contract and record its address
    Deploy(DeployArgs),
    /// Deploy fresh storage contracts and check store/getStore round trips
    SmokeTest(SmokeTestArgs),
    /// Interactively create a new deployment configuration file
    Init,
}

#[derive(Debug, Clone, clap::Args)]
#[clap(rename_all = "kebab-case")]
pub struct NetworkArgs {
    /// Path to the deployment configuration file
    #[clap(short, long, env = "DEPLOYER_CONFIG", default_value = "deployer.yml")]
    pub config: PathBuf,

    /// Name of the network profile to use
    ///
    /// Falls back to `default_network` from the configuration file
    #[clap(short, long, env = "DEPLOYER_NETWORK")]
    pub network: Option<String>,

    /// Private key to sign with, overrides the accounts of the network profile
    #[clap(short, long, env, hide_env_values = true)]
    pub private_key: Option<PrivateKey>,
}

#[derive(Debug, Clone, clap::Args)]
#[clap(rename_all = "kebab-case")]
pub struct DeployArgs {
    #[clap(flatten)]
    pub network: NetworkArgs,

    /// Contract to deploy, overrides `contract.name`
    ///
    /// Either a plain name like 'InsuranceFactory' or a fully qualified
    /// 'contracts/Insurance.sol:InsuranceFactory'
    #[clap(long, env = "DEPLOYER_CONTRACT")]
    pub contract: Option<String>,

    /// Where to write the address file, overrides `output.path`
    #[clap(short, long, env = "DEPLOYER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// The etherscan API key to use for verification
    #[clap(short, long, env, hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// Skip the confirmation prompt for non-local networks
    #[clap(short, long)]
    pub yes: bool,
}

#[derive(Debug, Clone, clap::Args)]
#[clap(rename_all = "kebab-case")]
pub struct SmokeTestArgs {
    #[clap(flatten)]
    pub network: NetworkArgs,

    /// Storage contract exposing `store(uint256)` and `getStore()`
    #[clap(long, default_value = "StorageVictimAudited")]
    pub contract: String,

    /// Amount written by the first store
    #[clap(long, default_value = "100")]
    pub amount: u64,

    /// Amount overwriting the first store
    #[clap(long, default_value = "200")]
    pub updated_amount: u64,
}
