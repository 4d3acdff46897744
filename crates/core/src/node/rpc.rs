use std::time::Duration;

use alloy::{
    eips::{eip2930::AccessList, BlockNumberOrTag},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, PendingTransactionConfig, Provider, RootProvider},
    rpc::{client::ClientBuilder, types::TransactionRequest},
};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{logging::LoggingLayer, NodeClient, NonceTag};
use crate::{error::Error, tx::SignedTx, Result};

/// [`NodeClient`] backed by an alloy provider.
#[derive(Clone)]
pub struct RpcNode {
    provider: DynProvider,
}

impl RpcNode {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Connects over HTTP with [`LoggingLayer`] installed on the transport.
    pub fn connect_http(url: Url) -> Self {
        let client = ClientBuilder::default().layer(LoggingLayer).http(url);
        Self::new(DynProvider::new(RootProvider::new(client)))
    }
}

#[async_trait]
impl NodeClient for RpcNode {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn nonce_at(&self, address: Address, tag: NonceTag) -> Result<u64> {
        let count = self.provider.get_transaction_count(address);
        let nonce = match tag {
            NonceTag::Latest => count.latest().await?,
            NonceTag::Pending => count.pending().await?,
        };
        Ok(nonce)
    }

    async fn suggest_fee_cap(&self) -> Result<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn suggest_tip_cap(&self) -> Result<u128> {
        Ok(self.provider.get_max_priority_fee_per_gas().await?)
    }

    async fn suggest_blob_fee(&self) -> Result<u128> {
        Ok(self.provider.get_blob_base_fee().await?)
    }

    async fn block_gas_limit(&self) -> Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or(Error::BlockMissing)?;
        Ok(block.header.gas_limit)
    }

    async fn balance_of(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn create_access_list(&self, request: &TransactionRequest) -> Result<AccessList> {
        let res = self.provider.create_access_list(request).await?;
        if let Some(err) = &res.error {
            // reverting payloads are expected while fuzzing; the list is still usable
            debug!("access list simulation reverted: {err}");
        }
        Ok(res.access_list)
    }

    async fn send_raw_transaction(&self, tx: &SignedTx) -> Result<TxHash> {
        let pending = self.provider.send_raw_transaction(&tx.encoded()).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_mined(&self, tx_hash: TxHash, timeout: Duration) -> Result<()> {
        let pending = self
            .provider
            .watch_pending_transaction(
                PendingTransactionConfig::new(tx_hash).with_timeout(Some(timeout)),
            )
            .await?;
        pending.await?;
        Ok(())
    }
}
