//! Sending contract creation transactions.

use alloy_chains::Chain;
use alloy_network::{AnyNetwork, EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::{
    DynProvider, PendingTransactionError, Provider, ProviderBuilder, WatchTxError,
};
use alloy_rpc_types::TransactionRequest;
use alloy_serde::WithOtherFields;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::TransportError;
use async_trait::async_trait;
use deploy_common::DeployProvider;
use std::time::Duration;

/// A confirmed contract deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Account that sent the creation transaction
    pub deployer: Address,
    /// Address of the new contract
    pub address: Address,
    /// Hash of the creation transaction
    pub transaction_hash: TxHash,
}

/// Errors raised while putting a contract on chain.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum DeployError {
    #[error("failed to query the chain ID of {url}")]
    ChainId {
        url: String,
        #[source]
        source: TransportError,
    },
    #[error(
        "network `{network}` expects chain {expected}, but the node at {url} serves chain {actual}"
    )]
    ChainIdMismatch { network: String, url: String, expected: Chain, actual: Chain },
    #[error("failed to submit the deployment transaction")]
    Submission(#[source] TransportError),
    #[error("deployment transaction {tx_hash} was not confirmed within {}s", timeout.as_secs())]
    Timeout { tx_hash: TxHash, timeout: Duration },
    #[error("deployment transaction {0} reverted")]
    Reverted(TxHash),
    #[error("failed to fetch the receipt of deployment transaction {tx_hash}")]
    Receipt {
        tx_hash: TxHash,
        #[source]
        source: PendingTransactionError,
    },
    #[error("deployment transaction {0} did not create a contract")]
    NoContractAddress(TxHash),
}

/// Puts contract creation code on chain.
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// The account that signs and pays for deployments.
    fn deployer(&self) -> Address;

    /// Sends a creation transaction for `code` and waits for `confirmations` blocks, at most
    /// `timeout`.
    async fn deploy(
        &self,
        code: Bytes,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<Deployment, DeployError>;
}

/// Deploys through a JSON-RPC node, signing locally.
#[derive(Clone, Debug)]
pub struct RpcDeployer {
    provider: DynProvider<AnyNetwork>,
    deployer: Address,
}

impl RpcDeployer {
    /// Wraps `provider` so transactions are signed by `signer`.
    ///
    /// Nonce, gas and fees are filled in from the node.
    pub fn new(provider: DeployProvider, signer: PrivateKeySigner) -> Self {
        let deployer = signer.address();
        let provider = ProviderBuilder::new()
            .network::<AnyNetwork>()
            .wallet(EthereumWallet::from(signer))
            .connect_provider(provider)
            .erased();
        Self { provider, deployer }
    }

    /// Like [`RpcDeployer::new`], but first makes sure the node at `url` serves `chain_id`.
    pub async fn connect(
        network: &str,
        url: &str,
        chain_id: u64,
        provider: DeployProvider,
        signer: PrivateKeySigner,
    ) -> Result<Self, DeployError> {
        let actual = provider
            .get_chain_id()
            .await
            .map_err(|source| DeployError::ChainId { url: url.to_string(), source })?;
        if actual != chain_id {
            return Err(DeployError::ChainIdMismatch {
                network: network.to_string(),
                url: url.to_string(),
                expected: Chain::from_id(chain_id),
                actual: Chain::from_id(actual),
            });
        }
        trace!(chain = %Chain::from_id(actual), "verified chain ID");
        Ok(Self::new(provider, signer))
    }
}

#[async_trait]
impl ContractDeployer for RpcDeployer {
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn deploy(
        &self,
        code: Bytes,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<Deployment, DeployError> {
        let tx = TransactionRequest::default().with_from(self.deployer).with_deploy_code(code);
        let pending = self
            .provider
            .send_transaction(WithOtherFields::new(tx))
            .await
            .map_err(DeployError::Submission)?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, confirmations, "sent deployment transaction");

        let receipt = pending
            .with_required_confirmations(confirmations)
            .with_timeout(Some(timeout))
            .get_receipt()
            .await
            .map_err(|err| watch_error(tx_hash, timeout, err))?;
        debug!(%tx_hash, block = ?receipt.block_number(), "deployment confirmed");

        confirmed_deployment(self.deployer, tx_hash, &receipt)
    }
}

/// Maps a failure while waiting for `tx_hash` to be confirmed.
fn watch_error(tx_hash: TxHash, timeout: Duration, err: PendingTransactionError) -> DeployError {
    match err {
        PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
            DeployError::Timeout { tx_hash, timeout }
        }
        source => DeployError::Receipt { tx_hash, source },
    }
}

/// Checks that the receipt of `tx_hash` belongs to a successful contract creation.
fn confirmed_deployment<R: ReceiptResponse>(
    deployer: Address,
    tx_hash: TxHash,
    receipt: &R,
) -> Result<Deployment, DeployError> {
    if !receipt.status() {
        return Err(DeployError::Reverted(tx_hash));
    }
    let address = receipt.contract_address().ok_or(DeployError::NoContractAddress(tx_hash))?;
    Ok(Deployment { deployer, address, transaction_hash: tx_hash })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_network::AnyTransactionReceipt;
    use alloy_primitives::{B256, U64, address};
    use alloy_provider::RootProvider;
    use alloy_rpc_client::RpcClient;
    use alloy_transport::{TransportErrorKind, mock::Asserter};
    use serde_json::json;

    const DEPLOYER: Address = address!("0x1111111111111111111111111111111111111111");

    fn signer() -> PrivateKeySigner {
        PrivateKeySigner::from_bytes(&B256::repeat_byte(1)).unwrap()
    }

    fn mocked_provider(asserter: &Asserter) -> DeployProvider {
        RootProvider::new(RpcClient::mocked(asserter.clone()))
    }

    fn receipt(status: bool, contract_address: Option<Address>) -> AnyTransactionReceipt {
        serde_json::from_value(json!({
            "type": "0x2",
            "status": if status { "0x1" } else { "0x0" },
            "cumulativeGasUsed": "0x1f4a0",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": B256::repeat_byte(0xaa),
            "transactionIndex": "0x0",
            "blockHash": B256::repeat_byte(0xbb),
            "blockNumber": "0x10",
            "gasUsed": "0x1f4a0",
            "effectiveGasPrice": "0x3b9aca00",
            "from": DEPLOYER,
            "to": null,
            "contractAddress": contract_address,
        }))
        .unwrap()
    }

    #[test]
    fn deployer_is_signer_address() {
        let signer = signer();
        let address = signer.address();
        let deployer = RpcDeployer::new(mocked_provider(&Asserter::new()), signer);
        assert_eq!(deployer.deployer(), address);
    }

    #[tokio::test]
    async fn connect_checks_chain_id() {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(31337));

        let err = RpcDeployer::connect(
            "alfajores",
            "http://localhost:8545",
            44787,
            mocked_provider(&asserter),
            signer(),
        )
        .await
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("network `alfajores` expects chain"), "{msg}");
        assert!(msg.contains("http://localhost:8545"), "{msg}");
        match err {
            DeployError::ChainIdMismatch { expected, actual, .. } => {
                assert_eq!(expected, Chain::from_id(44787));
                assert_eq!(actual, Chain::from_id(31337));
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[tokio::test]
    async fn connect_accepts_matching_chain() {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(44787));

        let signer = signer();
        let address = signer.address();
        let deployer = RpcDeployer::connect(
            "alfajores",
            "https://alfajores-forno.celo-testnet.org",
            44787,
            mocked_provider(&asserter),
            signer,
        )
        .await
        .unwrap();
        assert_eq!(deployer.deployer(), address);
    }

    #[tokio::test]
    async fn connect_reports_unreachable_node() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("connection refused");

        let err = RpcDeployer::connect(
            "alfajores",
            "http://localhost:8545",
            44787,
            mocked_provider(&asserter),
            signer(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DeployError::ChainId { .. }), "{err}");
    }

    #[test]
    fn successful_receipt() {
        let tx_hash = B256::repeat_byte(0xaa);
        let contract = DEPLOYER.create(0);

        let deployment = confirmed_deployment(DEPLOYER, tx_hash, &receipt(true, Some(contract)))
            .unwrap();
        assert_eq!(
            deployment,
            Deployment { deployer: DEPLOYER, address: contract, transaction_hash: tx_hash }
        );
    }

    #[test]
    fn reverted_receipt() {
        let tx_hash = B256::repeat_byte(0xaa);
        let receipt = receipt(false, Some(DEPLOYER.create(0)));

        let err = confirmed_deployment(DEPLOYER, tx_hash, &receipt).unwrap_err();
        assert!(matches!(err, DeployError::Reverted(hash) if hash == tx_hash), "{err}");
    }

    #[test]
    fn receipt_without_contract() {
        let tx_hash = B256::repeat_byte(0xaa);

        let err = confirmed_deployment(DEPLOYER, tx_hash, &receipt(true, None)).unwrap_err();
        assert!(matches!(err, DeployError::NoContractAddress(hash) if hash == tx_hash), "{err}");
    }

    #[test]
    fn watch_timeout_is_deployment_timeout() {
        let tx_hash = B256::repeat_byte(0xaa);
        let timeout = Duration::from_secs(120);

        let err = watch_error(
            tx_hash,
            timeout,
            PendingTransactionError::TxWatcher(WatchTxError::Timeout),
        );
        assert!(matches!(err, DeployError::Timeout { tx_hash: hash, .. } if hash == tx_hash));
        assert!(err.to_string().ends_with("was not confirmed within 120s"), "{err}");

        let err = watch_error(tx_hash, timeout, PendingTransactionError::FailedToRegister);
        assert!(matches!(err, DeployError::Receipt { .. }), "{err}");
    }

    #[test]
    fn submission_keeps_node_message() {
        let err = DeployError::Submission(TransportErrorKind::custom_str("insufficient funds"));
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("insufficient funds"), "{source}");
    }
}
