use std::fmt::Write;

use crate::config::{Config, Network};

mod create_config;
mod utils;

pub use self::create_config::create_config_interactive;

/// Lists what is about to be deployed where.
pub fn deployment_summary(config: &Config, network: &Network) -> String {
    let mut summary = String::new();

    let _ = writeln!(summary, "Network: {}", network.name);
    let _ = writeln!(summary, "  RPC: {}", network.profile.rpc_url);
    if let Some(chain_id) = network.profile.chain_id {
        let _ = writeln!(summary, "  Chain id: {chain_id}");
    }
    let _ = writeln!(summary, "Contract: {}", config.contract.name);
    if !config.contract.constructor_args.is_empty() {
        let _ = writeln!(
            summary,
            "  Constructor args: {}",
            config.contract.constructor_args.join(", ")
        );
    }
    let _ = writeln!(summary, "Compiler: {}", config.compiler.version);
    let _ = writeln!(
        summary,
        "Address file: {} ({})",
        config.output.path.display(),
        config.output.export_name
    );

    summary
}

/// Asks before sending a deployment to a network with real costs. Returns
/// false if the user declined or skipped the prompt.
pub fn confirm_deployment(
    config: &Config,
    network: &Network,
) -> eyre::Result<bool> {
    print!("{}", deployment_summary(config, network));

    let proceed = inquire::Confirm::new(&format!(
        "{} is not a local network, deploy anyway?",
        network.name
    ))
    .with_default(false)
    .prompt_skippable()?;

    Ok(proceed.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use indoc::indoc;

    use super::*;
    use crate::serde_utils;

    #[test]
    fn summary_lists_target() -> eyre::Result<()> {
        let config: Config = serde_utils::deserialize_str(
            Path::new("deployer.yml"),
            indoc! {r#"
                networks:
                  mumbai:
                    rpc_url: https://rpc-mumbai.maticvigil.com
                    chain_id: 80001
                compiler: 0.8.19
                contract:
                  name: InsuranceFactory
                  constructor_args: ["0x5FbDB2315678afecb367f032d93F642f64180aa3"]
            "#},
        )?;
        let network = config.network(None)?;

        assert_eq!(
            deployment_summary(&config, &network),
            indoc! {"
                Network: mumbai
                  RPC: https://rpc-mumbai.maticvigil.com
                  Chain id: 80001
                Contract: InsuranceFactory
                  Constructor args: 0x5FbDB2315678afecb367f032d93F642f64180aa3
                Compiler: 0.8.19
                Address file: scripts/contractAddress.js (contractAddress)
            "}
        );

        Ok(())
    }
}
