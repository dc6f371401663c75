use std::collections::BTreeMap;
use std::path::PathBuf;

use reqwest::Url;

use super::utils::{
    prompt_text_handle_errors, prompt_text_skippable_handle_errors,
};
use crate::config::{
    CompilerProfile, Config, ContractTarget, NetworkProfile, OptimizerSettings,
    OutputTarget, DEFAULT_ARTIFACTS_DIR, DEFAULT_EXPORT_NAME,
    DEFAULT_OUTPUT_PATH, DEFAULT_REPORT_DIR,
};
use crate::credentials::CredentialSource;
use crate::types::{ChainId, Confirmations, OptimizerRuns};

#[derive(Clone, Debug, derive_more::Display)]
enum CreateConfigMenu {
    #[display(fmt = "Add network")]
    AddNetwork,
    #[display(fmt = "Remove networks")]
    RemoveNetworks,
    #[display(fmt = "Proceed")]
    Proceed,
}

pub async fn create_config_interactive() -> eyre::Result<PathBuf> {
    let config_path = loop {
        let filename = inquire::Text::new("Config filename:")
            .with_default("deployer.yml")
            .prompt()?;

        let config_path = PathBuf::from(filename);

        if config_path.exists() {
            let overwrite =
                inquire::Confirm::new("Overwrite existing file?").prompt()?;

            if !overwrite {
                continue;
            }
        }

        break config_path;
    };

    let contract = inquire::Text::new("Contract name:").prompt()?;
    let artifacts_dir = inquire::Text::new("Artifacts directory:")
        .with_default(DEFAULT_ARTIFACTS_DIR)
        .prompt()?;
    let output_path = inquire::Text::new("Address file:")
        .with_default(DEFAULT_OUTPUT_PATH)
        .prompt()?;
    let export_name = inquire::Text::new("Exported constant:")
        .with_default(DEFAULT_EXPORT_NAME)
        .prompt()?;

    let compiler = prompt_compiler()?;

    let mut config = Config {
        default_network: None,
        networks: BTreeMap::default(),
        compiler,
        contract: ContractTarget {
            name: contract.trim().to_string(),
            artifacts_dir: artifacts_dir.into(),
            constructor_args: vec![],
        },
        output: OutputTarget {
            path: output_path.into(),
            export_name: export_name.trim().to_string(),
        },
        confirmations: Confirmations(1),
        confirmation_timeout_secs: 300,
        report_dir: DEFAULT_REPORT_DIR.into(),
        root: PathBuf::new(),
    };

    loop {
        print_networks(&config);

        let option = inquire::Select::new(
            "Menu (Esc to quit):",
            vec![
                CreateConfigMenu::AddNetwork,
                CreateConfigMenu::RemoveNetworks,
                CreateConfigMenu::Proceed,
            ],
        )
        .prompt_skippable()?;

        match option {
            Some(CreateConfigMenu::AddNetwork) => {
                let (name, profile) = prompt_network()?;

                if config.networks.contains_key(&name) {
                    let should_replace = inquire::Confirm::new(&format!(
                        "Network {name} already exists, do you want to replace it?"
                    ))
                    .prompt()?;

                    if !should_replace {
                        continue;
                    }
                }

                config.networks.insert(name, profile);
            }
            Some(CreateConfigMenu::RemoveNetworks) => {
                let existing =
                    config.networks.keys().cloned().collect::<Vec<_>>();

                let Some(selected) = inquire::MultiSelect::new(
                    "Select networks to remove:",
                    existing,
                )
                .prompt_skippable()?
                else {
                    continue;
                };

                for name in selected {
                    config.networks.remove(&name);
                }
            }
            Some(CreateConfigMenu::Proceed) => {
                if config.networks.is_empty() {
                    println!("Add at least one network");
                    continue;
                }

                break;
            }
            None => std::process::exit(0),
        }
    }

    if config.networks.len() > 1 {
        let names = config.networks.keys().cloned().collect();
        config.default_network =
            inquire::Select::new("Default network:", names).prompt_skippable()?;
    }

    if let Err(err) = config.validate() {
        println!("Warning: {err}");
    }

    crate::serde_utils::write_serialize(&config_path, &config).await?;

    println!("Config written to {}", config_path.display());

    Ok(config_path)
}

fn prompt_compiler() -> eyre::Result<CompilerProfile> {
    let version = inquire::Text::new("Solidity compiler version:")
        .with_default("0.8.19")
        .prompt()?;

    let enabled = inquire::Confirm::new("Optimizer enabled?")
        .with_default(false)
        .prompt()?;

    let runs = if enabled {
        prompt_text_handle_errors::<OptimizerRuns>("Optimizer runs:")?
    } else {
        OptimizerSettings::default().runs
    };

    Ok(CompilerProfile {
        version: version.trim().to_string(),
        optimizer: OptimizerSettings { enabled, runs },
    })
}

fn prompt_network() -> eyre::Result<(String, NetworkProfile)> {
    let name = inquire::Text::new("Network name:").prompt()?;
    let rpc_url: Url = prompt_text_handle_errors("RPC URL:")?;
    let chain_id: Option<ChainId> =
        prompt_text_skippable_handle_errors("Chain id (Esc to skip):")?;

    let mut accounts = vec![];

    while let Some(var) = inquire::Text::new(
        "Environment variable holding an account key (Esc to finish):",
    )
    .prompt_skippable()?
    {
        let var = var.trim();
        if !var.is_empty() {
            accounts.push(CredentialSource::Env {
                var: var.to_string(),
            });
        }
    }

    if accounts.is_empty() {
        accounts.push(CredentialSource::Prompt);
    }

    let legacy = inquire::Confirm::new("Send legacy transactions?")
        .with_default(false)
        .prompt()?;

    let profile = NetworkProfile {
        rpc_url: rpc_url.to_string(),
        chain_id,
        accounts,
        legacy,
        poll_interval_ms: 1000,
    };

    Ok((name.trim().to_string(), profile))
}

fn print_networks(config: &Config) {
    println!("Networks:");
    for (name, profile) in &config.networks {
        println!("  {name}: {}", profile.rpc_url);
        if let Some(chain_id) = profile.chain_id {
            println!("    Chain id: {chain_id}");
        }
        println!("    Accounts: {}", profile.accounts.len());
    }
}
