use std::path::PathBuf;

use ethers::providers::JsonRpcClient;
use tracing::{info, instrument, warn};

use self::steps::deploy_contract::{self, DeployedContract};
use self::steps::{assemble_report, record_address, verify};
use crate::cli::{DeployArgs, PrivateKey};
use crate::config::{Config, Network};
use crate::credentials::CredentialProvider;
use crate::error::{ConfigError, DeployError};
use crate::interactive;

pub mod deployment_context;
pub mod steps;

pub use self::deployment_context::DeploymentContext;

/// Signer for the `index`th account of `network`, or the explicitly given
/// key which always takes precedence.
pub fn credential_for(
    config: &Config,
    network: &Network,
    explicit: Option<&PrivateKey>,
    index: usize,
) -> Result<Box<dyn CredentialProvider>, ConfigError> {
    if let (Some(key), 0) = (explicit, index) {
        return Ok(Box::new(key.clone()));
    }

    let source = network
        .profile
        .accounts
        .get(index)
        .ok_or_else(|| ConfigError::NoAccounts(network.name.clone()))?;

    Ok(source.provider(&config.root, format!("{}#{index}", network.name)))
}

/// Connects to `network` and runs [`deploy_with_context`].
#[instrument(skip_all, fields(network = %network.name))]
pub async fn deploy_and_record(
    config: &Config,
    network: &Network,
    credential: &dyn CredentialProvider,
) -> Result<(DeploymentContext, DeployedContract), DeployError> {
    let context = DeploymentContext::connect(config, network, credential).await?;

    let deployed = deploy_with_context(&context, config).await?;

    Ok((context, deployed))
}

/// Deploys the configured contract, records the address and then writes
/// the report. Nothing is written unless the contract is confirmed.
pub async fn deploy_with_context<P>(
    context: &DeploymentContext<P>,
    config: &Config,
) -> Result<DeployedContract, DeployError>
where
    P: JsonRpcClient + 'static,
{
    let deployed =
        deploy_contract::deploy(context, config, &config.contract).await?;

    let address_file = config.project_path(&config.output.path);

    record_address::record_address(
        &address_file,
        &config.output.export_name,
        deployed.output.deployed_to,
    )?;

    let report = assemble_report::assemble_report(
        context,
        config,
        &deployed,
        address_file,
    );
    assemble_report::write_report(config, &report).await?;

    Ok(deployed)
}

pub async fn run_deployment(args: DeployArgs) -> eyre::Result<()> {
    let mut config = Config::load(&args.network.config).await?;

    if let Some(contract) = args.contract {
        config.contract.name = contract;
    }

    if let Some(output) = args.output {
        config.output.path = absolute(output)?;
    }

    let network = config.network(args.network.network.as_deref())?;

    if !args.yes
        && !network.is_local()
        && !interactive::confirm_deployment(&config, &network)?
    {
        info!("Deployment cancelled");
        return Ok(());
    }

    let credential =
        credential_for(&config, &network, args.network.private_key.as_ref(), 0)?;

    let (context, deployed) =
        deploy_and_record(&config, &network, credential.as_ref()).await?;

    println!(
        "{} deployed to: {:?}",
        deployed.artifact.spec.name, deployed.output.deployed_to
    );

    if let Some(etherscan_api_key) = args.etherscan_api_key.as_deref() {
        if let Err(err) =
            verify::verify(&context, &config, &deployed, etherscan_api_key)
                .await
        {
            warn!("Verification failed: {err:#}");
        }
    }

    Ok(())
}

fn absolute(path: PathBuf) -> eyre::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }

    Ok(std::env::current_dir()?.join(path))
}
