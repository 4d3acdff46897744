mod logging;
pub mod mock;
mod rpc;

use std::time::Duration;

use alloy::{
    eips::eip2930::AccessList,
    primitives::{Address, TxHash, U256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use tracing::warn;

use crate::{tx::SignedTx, Result};

pub use logging::{LoggingLayer, LoggingService};
pub use mock::MockNode;
pub use rpc::RpcNode;

/// Chain id used when the node cannot report one.
pub const DEFAULT_CHAIN_ID: u64 = 0x0100_0666;

/// Which view of an account's nonce to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonceTag {
    /// Transactions included in the latest block.
    Latest,
    /// Latest plus everything the node holds in its pool.
    Pending,
}

/// The RPC surface of a target node. Implementations must tolerate concurrent callers.
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn nonce_at(&self, address: Address, tag: NonceTag) -> Result<u64>;

    /// Suggested max fee per gas.
    async fn suggest_fee_cap(&self) -> Result<u128>;

    /// Suggested max priority fee per gas.
    async fn suggest_tip_cap(&self) -> Result<u128>;

    /// Current blob base fee.
    async fn suggest_blob_fee(&self) -> Result<u128>;

    /// Gas limit of the latest block header.
    async fn block_gas_limit(&self) -> Result<u64>;

    async fn balance_of(&self, address: Address) -> Result<U256>;

    /// Simulates `request` and returns the storage slots and addresses it touches.
    async fn create_access_list(&self, request: &TransactionRequest) -> Result<AccessList>;

    async fn send_raw_transaction(&self, tx: &SignedTx) -> Result<TxHash>;

    /// Resolves once `tx_hash` is included, or fails after `timeout`.
    async fn wait_mined(&self, tx_hash: TxHash, timeout: Duration) -> Result<()>;
}

/// Returns the node's chain id, or [`DEFAULT_CHAIN_ID`] if the query fails.
pub async fn chain_id_or_default(node: &dyn NodeClient) -> u64 {
    match node.chain_id().await {
        Ok(chain_id) => chain_id,
        Err(e) => {
            warn!("Could not get chainID, using default: {e}");
            DEFAULT_CHAIN_ID
        }
    }
}
