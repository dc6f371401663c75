use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::deploy_contract::DeployedContract;
use crate::config::Config;
use crate::deployment::DeploymentContext;
use crate::error::DeployError;
use crate::report::Report;
use crate::serde_utils;

pub const REPORT_EXTENSION: &str = "yml";

pub fn report_path(report_dir: &Path, network: &str, contract: &str) -> PathBuf {
    report_dir
        .join(network)
        .join(format!("{contract}.{REPORT_EXTENSION}"))
}

pub fn assemble_report<P>(
    context: &DeploymentContext<P>,
    config: &Config,
    deployed: &DeployedContract,
    address_file: PathBuf,
) -> Report {
    Report {
        network: context.network.name.clone(),
        chain_id: context.chain_id,
        compiler: config.compiler.clone(),
        deployment: deployed.into(),
        address_file,
    }
}

#[instrument(skip_all)]
pub async fn write_report(
    config: &Config,
    report: &Report,
) -> Result<PathBuf, DeployError> {
    let path = report_path(
        &config.project_path(&config.report_dir),
        &report.network,
        report.deployment.contract_name(),
    );

    serde_utils::write_serialize(&path, report)
        .await
        .map_err(|err| {
            DeployError::file_write(
                &path,
                std::io::Error::new(std::io::ErrorKind::Other, format!("{err:#}")),
            )
        })?;

    info!("Report written to {}", path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use ethers::types::{Address, H256};

    use super::*;
    use crate::config::{CompilerProfile, OptimizerSettings};
    use crate::report::contract_deployment::ContractDeployment;
    use crate::types::{ChainId, OptimizerRuns};

    fn report() -> Report {
        Report {
            network: "mumbai".into(),
            chain_id: ChainId(80001),
            compiler: CompilerProfile {
                version: "0.8.20".into(),
                optimizer: OptimizerSettings {
                    enabled: true,
                    runs: OptimizerRuns(200),
                },
            },
            deployment: ContractDeployment {
                contract: "contracts/Insurance.sol:InsuranceFactory".into(),
                address: Address::repeat_byte(0x11),
                deployer: Address::repeat_byte(0x22),
                transaction_hash: H256::repeat_byte(0x33),
                block_number: Some(42),
            },
            address_file: "scripts/contractAddress.js".into(),
        }
    }

    #[test]
    fn report_path_layout() {
        assert_eq!(
            report_path(Path::new("deployments"), "mumbai", "InsuranceFactory"),
            PathBuf::from("deployments/mumbai/InsuranceFactory.yml")
        );
    }

    #[tokio::test]
    async fn writes_and_overwrites_report() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;

        let mut config: Config = serde_utils::deserialize_str(
            Path::new("deployer.yml"),
            indoc::indoc! {r#"
                networks:
                  mumbai:
                    rpc_url: https://rpc-mumbai.maticvigil.com
                compiler: 0.8.20
                contract:
                  name: InsuranceFactory
            "#},
        )?;
        config.root = dir.path().to_owned();

        let first = report();
        let path = write_report(&config, &first).await?;
        assert_eq!(
            path,
            dir.path().join("deployments/mumbai/InsuranceFactory.yml")
        );

        let mut second = report();
        second.deployment.address = Address::repeat_byte(0x44);
        write_report(&config, &second).await?;

        let written: Report = serde_utils::read_deserialize(&path).await?;
        assert_eq!(written, second);

        Ok(())
    }
}
