use std::path::PathBuf;

use tracing::instrument;

use super::deploy_contract::DeployedContract;
use crate::config::Config;
use crate::deployment::DeploymentContext;
use crate::forge_utils::ForgeVerify;

pub fn forge_verify(
    context: &DeploymentContext,
    config: &Config,
    deployed: &DeployedContract,
    etherscan_api_key: &str,
) -> ForgeVerify {
    let root = if config.root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        config.root.clone()
    };

    let mut forge_verify = ForgeVerify::new(
        deployed.artifact.spec.clone(),
        deployed.output.deployed_to,
    )
    .with_root(root)
    .with_chain(context.chain_id)
    .with_etherscan_api_key(etherscan_api_key)
    .with_compiler_version(&config.compiler.version);

    if config.compiler.optimizer.enabled {
        forge_verify =
            forge_verify.with_optimizer_runs(config.compiler.optimizer.runs);
    }

    if !deployed.constructor_args.is_empty() {
        forge_verify =
            forge_verify.with_constructor_args(deployed.constructor_args.clone());
    }

    forge_verify
}

#[instrument(skip_all)]
pub async fn verify(
    context: &DeploymentContext,
    config: &Config,
    deployed: &DeployedContract,
    etherscan_api_key: &str,
) -> eyre::Result<()> {
    forge_verify(context, config, deployed, etherscan_api_key)
        .run()
        .await
}
