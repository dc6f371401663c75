use clap::Parser;
use cli::{Args, Command};
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub mod abis;
pub mod artifact;
pub mod credentials;
pub mod ethers_utils;
pub mod forge_utils;
pub mod rpc_signer;
pub mod serde_utils;

mod cli;
mod config;
mod error;
mod report;
mod types;

mod deployment;

mod interactive;

async fn start() -> eyre::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Deploy(args) => deployment::run_deployment(args).await,
        Command::SmokeTest(args) => smoke_test::run_smoke_test(args).await,
        Command::Init => {
            interactive::create_config_interactive().await?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    dotenv::dotenv().ok();

    let indicatif_layer = IndicatifLayer::new();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    match start().await {
        Ok(()) => Ok(()),
        Err(report) => {
            tracing::error!("{:?}", report);
            std::process::exit(1)
        }
    }
}
