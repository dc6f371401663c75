use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};

use crate::deployment::steps::deploy_contract::DeployedContract;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ContractDeployment {
    pub contract: String,
    pub address: Address,
    pub deployer: Address,
    pub transaction_hash: H256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl ContractDeployment {
    /// Contract name without the source path
    pub fn contract_name(&self) -> &str {
        self.contract
            .rsplit_once(':')
            .map_or(self.contract.as_str(), |(_, name)| name)
    }
}

impl From<&DeployedContract> for ContractDeployment {
    fn from(value: &DeployedContract) -> Self {
        Self {
            contract: value.artifact.spec.to_string(),
            address: value.output.deployed_to,
            deployer: value.output.deployer,
            transaction_hash: value.output.transaction_hash,
            block_number: value.output.block_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_name_strips_source() {
        let mut deployment = ContractDeployment {
            contract: "contracts/Audited.sol:StorageVictimAudited".into(),
            address: Address::zero(),
            deployer: Address::zero(),
            transaction_hash: H256::zero(),
            block_number: None,
        };

        assert_eq!(deployment.contract_name(), "StorageVictimAudited");

        deployment.contract = "InsuranceFactory".into();
        assert_eq!(deployment.contract_name(), "InsuranceFactory");
    }
}
