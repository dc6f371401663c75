use ethers::providers::JsonRpcClient;
use ethers::types::Bytes;
use tracing::{info, instrument, warn};

use crate::artifact::ContractArtifact;
use crate::config::{CompilerProfile, Config, ContractTarget};
use crate::deployment::DeploymentContext;
use crate::error::DeployError;
use crate::ethers_utils::CreateOutput;
use crate::forge_utils::ContractSpec;

#[derive(Debug, Clone)]
pub struct DeployedContract {
    pub artifact: ContractArtifact,
    pub constructor_args: Bytes,
    pub output: CreateOutput,
}

#[instrument(skip_all, fields(contract = %target.name))]
pub async fn deploy<P>(
    context: &DeploymentContext<P>,
    config: &Config,
    target: &ContractTarget,
) -> Result<DeployedContract, DeployError>
where
    P: JsonRpcClient + 'static,
{
    let spec = ContractSpec::from(target.name.as_str());
    let artifacts_dir = config.project_path(&target.artifacts_dir);

    let artifact = ContractArtifact::resolve(&artifacts_dir, &spec)?;

    info!("Using artifact {}", artifact.path.display());
    warn_on_compiler_mismatch(&artifact, &config.compiler);

    let code = artifact.creation_code(&target.constructor_args)?;
    let constructor_args =
        artifact.encoded_constructor_args(&target.constructor_args)?;

    let output = context
        .contract_create(artifact.spec.clone(), code)
        .send(&context.rpc_signer)
        .await?;

    Ok(DeployedContract {
        artifact,
        constructor_args,
        output,
    })
}

fn warn_on_compiler_mismatch(
    artifact: &ContractArtifact,
    compiler: &CompilerProfile,
) {
    if artifact.compiled_with(&compiler.version) == Some(false) {
        warn!(
            "{} was compiled with {}, the compiler profile says {}",
            artifact.spec,
            artifact.compiler_version.as_deref().unwrap_or_default(),
            compiler.version
        );
    }
}
