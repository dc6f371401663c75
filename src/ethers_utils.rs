use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use ethers::providers::{JsonRpcClient, Middleware};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{
    Address, Bytes, Eip1559TransactionRequest, TransactionReceipt,
    TransactionRequest, H256,
};
use ethers::utils::get_contract_address;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::style::ProgressStyle;

use crate::error::DeployError;
use crate::forge_utils::ContractSpec;
use crate::rpc_signer::RpcSigner;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutput {
    pub deployer: Address,
    pub deployed_to: Address,
    pub transaction_hash: H256,
    pub block_number: Option<u64>,
}

#[derive(Debug)]
pub struct ContractCreate {
    contract_spec: ContractSpec,
    code: Bytes,
    nonce: u64,
    legacy: bool,
    confirmations: usize,
    timeout: Duration,
    poll_interval: Duration,
}

impl ContractCreate {
    pub fn new(contract_spec: ContractSpec, code: Bytes, nonce: u64) -> Self {
        Self {
            contract_spec,
            code,
            nonce,
            legacy: false,
            confirmations: 1,
            timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_legacy(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn with_confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn request(&self, from: Address) -> TypedTransaction {
        if self.legacy {
            TransactionRequest::new()
                .from(from)
                .data(self.code.clone())
                .nonce(self.nonce)
                .into()
        } else {
            Eip1559TransactionRequest::new()
                .from(from)
                .data(self.code.clone())
                .nonce(self.nonce)
                .into()
        }
    }

    fn rejected(&self, err: impl Display) -> DeployError {
        DeployError::Rejected {
            contract: self.contract_spec.to_string(),
            reason: err.to_string(),
        }
    }

    #[instrument(name = "contract_create", skip_all, fields(contract = %self.contract_spec))]
    pub async fn send<P>(
        &self,
        signer: &RpcSigner<P>,
    ) -> Result<CreateOutput, DeployError>
    where
        P: JsonRpcClient + 'static,
    {
        let deployer = signer.address();
        let expected = get_contract_address(deployer, self.nonce);

        info!(
            "Deploying from {deployer:?} with nonce {}, expecting {expected:?}",
            self.nonce
        );

        let mut tx = self.request(deployer);

        signer
            .client
            .fill_transaction(&mut tx, None)
            .await
            .map_err(|err| self.rejected(err))?;

        let pending = signer
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|err| self.rejected(err))?;

        let tx_hash = *pending;

        info!(
            "Submitted {tx_hash:?}, waiting for {} confirmation(s)",
            self.confirmations
        );

        let receipt = wait_for_receipt(
            pending
                .confirmations(self.confirmations)
                .interval(self.poll_interval),
            &self.contract_spec,
            tx_hash,
            self.timeout,
        )
        .await?;

        let output = check_receipt(&self.contract_spec, &receipt, expected)?;

        info!("Created: {output:?}");

        Ok(output)
    }
}

#[instrument(skip_all, fields(tx_hash = ?tx_hash))]
pub async fn wait_for_receipt<F, E>(
    pending: F,
    contract_spec: &ContractSpec,
    tx_hash: H256,
    timeout: Duration,
) -> Result<TransactionReceipt, DeployError>
where
    F: Future<Output = Result<Option<TransactionReceipt>, E>>,
    E: Display,
{
    let style = ProgressStyle::with_template(
        "{spinner:.green} waiting for confirmation of {span_fields} {elapsed}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_spinner());
    Span::current().pb_set_style(&style);

    match tokio::time::timeout(timeout, pending).await {
        Err(_elapsed) => {
            Err(DeployError::ConfirmationTimeout { tx_hash, timeout })
        }
        Ok(Err(err)) => Err(DeployError::Dropped {
            contract: contract_spec.to_string(),
            tx_hash,
            reason: err.to_string(),
        }),
        Ok(Ok(None)) => Err(DeployError::Dropped {
            contract: contract_spec.to_string(),
            tx_hash,
            reason: "transaction dropped from the mempool".into(),
        }),
        Ok(Ok(Some(receipt))) => Ok(receipt),
    }
}

pub fn check_receipt(
    contract_spec: &ContractSpec,
    receipt: &TransactionReceipt,
    expected: Address,
) -> Result<CreateOutput, DeployError> {
    let tx_hash = receipt.transaction_hash;

    if receipt.status != Some(1.into()) {
        return Err(DeployError::Reverted {
            contract: contract_spec.to_string(),
            tx_hash,
        });
    }

    let Some(deployed_to) = receipt.contract_address else {
        return Err(DeployError::Dropped {
            contract: contract_spec.to_string(),
            tx_hash,
            reason: "receipt has no contract address".into(),
        });
    };

    if deployed_to != expected {
        return Err(DeployError::address_mismatch(
            contract_spec,
            tx_hash,
            expected,
            deployed_to,
        ));
    }

    Ok(CreateOutput {
        deployer: receipt.from,
        deployed_to,
        transaction_hash: tx_hash,
        block_number: receipt.block_number.map(|number| number.as_u64()),
    })
}

#[cfg(test)]
mod tests {
    use ethers::types::U64;

    use super::*;

    fn deployer() -> Address {
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap()
    }

    fn receipt(status: u64, contract_address: Option<Address>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: H256::repeat_byte(0xab),
            from: deployer(),
            status: Some(U64::from(status)),
            contract_address,
            block_number: Some(U64::from(7)),
            ..Default::default()
        }
    }

    #[test]
    fn consecutive_deployments_get_distinct_addresses() {
        let first = get_contract_address(deployer(), 0u64);
        let second = get_contract_address(deployer(), 1u64);

        // First contract created by the first hardhat dev account
        assert_eq!(
            first,
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
                .parse::<Address>()
                .unwrap()
        );
        assert_ne!(first, second);
    }

    #[test]
    fn successful_receipt() -> eyre::Result<()> {
        let spec = ContractSpec::name("InsuranceFactory");
        let expected = get_contract_address(deployer(), 0u64);

        let output = check_receipt(&spec, &receipt(1, Some(expected)), expected)?;

        assert_eq!(
            output,
            CreateOutput {
                deployer: deployer(),
                deployed_to: expected,
                transaction_hash: H256::repeat_byte(0xab),
                block_number: Some(7),
            }
        );

        Ok(())
    }

    #[test]
    fn failed_receipts() {
        let spec = ContractSpec::name("InsuranceFactory");
        let expected = get_contract_address(deployer(), 0u64);
        let other = get_contract_address(deployer(), 1u64);

        assert!(matches!(
            check_receipt(&spec, &receipt(0, Some(expected)), expected),
            Err(DeployError::Reverted { .. })
        ));
        assert!(matches!(
            check_receipt(&spec, &receipt(1, None), expected),
            Err(DeployError::Dropped { .. })
        ));
        assert!(matches!(
            check_receipt(&spec, &receipt(1, Some(other)), expected),
            Err(DeployError::Dropped { .. })
        ));
    }

    #[tokio::test]
    async fn times_out_waiting_for_receipt() {
        let spec = ContractSpec::name("InsuranceFactory");
        let never = std::future::pending::<Result<Option<TransactionReceipt>, String>>();

        let result = wait_for_receipt(
            never,
            &spec,
            H256::zero(),
            Duration::from_millis(10),
        )
        .await;

        assert!(matches!(
            result,
            Err(DeployError::ConfirmationTimeout { timeout, .. })
                if timeout == Duration::from_millis(10)
        ));
    }

    #[tokio::test]
    async fn dropped_transaction() {
        let spec = ContractSpec::name("InsuranceFactory");
        let dropped = async { Ok::<_, String>(None) };

        let result =
            wait_for_receipt(dropped, &spec, H256::zero(), Duration::from_secs(1))
                .await;

        assert!(matches!(result, Err(DeployError::Dropped { .. })));
    }

    #[test]
    fn legacy_request() {
        let create = ContractCreate::new(
            ContractSpec::name("TokenVesting"),
            Bytes::from(vec![0x60, 0x80]),
            3,
        )
        .with_legacy(true);

        let tx = create.request(deployer());

        assert!(matches!(tx, TypedTransaction::Legacy(_)));
        assert_eq!(tx.to(), None);
        assert_eq!(tx.nonce(), Some(&3.into()));
        assert_eq!(tx.data(), Some(&Bytes::from(vec![0x60, 0x80])));
    }
}
