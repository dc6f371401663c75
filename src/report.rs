use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::CompilerProfile;
use crate::types::ChainId;

pub mod contract_deployment;

use self::contract_deployment::ContractDeployment;

/// Outcome of the latest deployment of a contract to a network. Each run
/// overwrites the previous report.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub network: String,
    pub chain_id: ChainId,
    pub compiler: CompilerProfile,
    pub deployment: ContractDeployment,
    pub address_file: PathBuf,
}
