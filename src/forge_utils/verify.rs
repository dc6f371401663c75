use std::path::PathBuf;

use ethers::types::{Address, Bytes};
use eyre::ContextCompat;
use tracing::{info, instrument};

use super::ContractSpec;
use crate::types::{ChainId, OptimizerRuns};

#[derive(Debug)]
pub struct ForgeVerify {
    spec: ContractSpec,
    address: Address,
    root: Option<PathBuf>,
    chain: Option<ChainId>,
    etherscan_api_key: Option<String>,
    compiler_version: Option<String>,
    optimizer_runs: Option<OptimizerRuns>,
    constructor_args: Option<Bytes>,
}

impl ForgeVerify {
    pub fn new(spec: ContractSpec, address: Address) -> Self {
        Self {
            spec,
            address,
            root: None,
            chain: None,
            etherscan_api_key: None,
            compiler_version: None,
            optimizer_runs: None,
            constructor_args: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_chain(mut self, chain: ChainId) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_etherscan_api_key(
        mut self,
        etherscan_api_key: impl ToString,
    ) -> Self {
        self.etherscan_api_key = Some(etherscan_api_key.to_string());
        self
    }

    pub fn with_compiler_version(
        mut self,
        compiler_version: impl ToString,
    ) -> Self {
        self.compiler_version = Some(compiler_version.to_string());
        self
    }

    pub fn with_optimizer_runs(mut self, runs: OptimizerRuns) -> Self {
        self.optimizer_runs = Some(runs);
        self
    }

    pub fn with_constructor_args(mut self, constructor_args: Bytes) -> Self {
        self.constructor_args = Some(constructor_args);
        self
    }

    pub fn command(&self) -> eyre::Result<tokio::process::Command> {
        let mut cmd = tokio::process::Command::new("forge");
        cmd.arg("verify-contract");

        cmd.arg("--watch");

        let root = self.root.as_ref().context("Missing root")?;

        cmd.arg("--root");
        cmd.arg(root);

        let chain = self.chain.as_ref().context("Missing chain")?;

        cmd.arg("--chain");
        cmd.arg(chain.to_string());

        let etherscan_api_key = self
            .etherscan_api_key
            .as_ref()
            .context("Missing etherscan api key")?;

        cmd.arg("--etherscan-api-key");
        cmd.arg(etherscan_api_key);

        if let Some(compiler_version) = &self.compiler_version {
            cmd.arg("--compiler-version");
            cmd.arg(compiler_version);
        }

        if let Some(runs) = self.optimizer_runs {
            cmd.arg("--num-of-optimizations");
            cmd.arg(runs.to_string());
        }

        if let Some(constructor_args) = &self.constructor_args {
            cmd.arg("--constructor-args");
            cmd.arg(format!("{constructor_args}"));
        }

        cmd.arg(format!("{:?}", self.address));
        cmd.arg(self.spec.to_string());

        Ok(cmd)
    }

    #[instrument(name = "forge_verify", skip_all)]
    pub async fn run(&self) -> eyre::Result<()> {
        let mut cmd = self.command()?;

        // The api key is part of the command line
        info!("Verifying {} at {:?}", self.spec, self.address);

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge verify failed: {}", stderr);
        }

        Ok(())
    }
}
