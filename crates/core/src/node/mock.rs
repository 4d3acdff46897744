use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

use alloy::{
    eips::eip2930::{AccessList, AccessListItem},
    primitives::{keccak256, Address, TxHash, TxKind, U256},
    rpc::types::TransactionRequest,
    transports::TransportErrorKind,
};
use async_trait::async_trait;

use super::{NodeClient, NonceTag};
use crate::{tx::SignedTx, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MockNonces {
    pub latest: u64,
    pub pending: u64,
}

#[derive(Default)]
struct MockState {
    nonces: HashMap<Address, MockNonces>,
    sent: Vec<SignedTx>,
    pending_nonce_queries: u64,
    latest_nonce_queries: u64,
    access_list_requests: Vec<TransactionRequest>,
    wait_calls: u64,
}

/// In-memory [`NodeClient`] that mines every accepted transaction immediately.
///
/// Nonce rules follow a real pool: a nonce equal to the pending nonce is appended,
/// one between latest and pending replaces a queued tx, anything else is rejected.
pub struct MockNode {
    state: Mutex<MockState>,
    chain_id: Option<u64>,
    fee_cap: Option<u128>,
    tip_cap: Option<u128>,
    blob_fee: Option<u128>,
    balance: U256,
    block_gas_limit: u64,
    auto_mine: bool,
    confirm: bool,
    failing_senders: HashSet<Address>,
    fail_sends_after: Option<usize>,
    fail_access_lists: bool,
}

impl Default for MockNode {
    fn default() -> Self {
        Self::new()
    }
}

fn mock_err<T>(msg: &str) -> Result<T> {
    Err(TransportErrorKind::custom_str(msg).into())
}

/// The access list [`MockNode`] reports for `request`: the callee (or sender, for creations)
/// with one slot derived from the calldata.
pub fn mock_access_list(request: &TransactionRequest) -> AccessList {
    let address = match request.to {
        Some(TxKind::Call(to)) => to,
        _ => request.from.unwrap_or_default(),
    };
    let slot = keccak256(request.input.input().cloned().unwrap_or_default());
    AccessList(vec![AccessListItem {
        address,
        storage_keys: vec![slot],
    }])
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            chain_id: Some(1337),
            fee_cap: Some(20_000_000_000),
            tip_cap: Some(1_000_000_000),
            blob_fee: Some(1),
            balance: U256::MAX,
            block_gas_limit: 30_000_000,
            auto_mine: true,
            confirm: true,
            failing_senders: HashSet::new(),
            fail_sends_after: None,
            fail_access_lists: false,
        }
    }

    pub fn with_fee_suggestions(mut self, fee_cap: u128, tip_cap: u128) -> Self {
        self.fee_cap = Some(fee_cap);
        self.tip_cap = Some(tip_cap);
        self
    }

    /// Makes `eth_gasPrice` and `eth_maxPriorityFeePerGas` fail.
    pub fn without_fee_suggestions(mut self) -> Self {
        self.fee_cap = None;
        self.tip_cap = None;
        self
    }

    pub fn without_chain_id(mut self) -> Self {
        self.chain_id = None;
        self
    }

    /// Balance reported for every address.
    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_block_gas_limit(mut self, gas_limit: u64) -> Self {
        self.block_gas_limit = gas_limit;
        self
    }

    /// Accepted txs stay pending instead of being mined.
    pub fn without_auto_mine(mut self) -> Self {
        self.auto_mine = false;
        self
    }

    /// Makes every `wait_mined` call fail.
    pub fn without_confirmations(mut self) -> Self {
        self.confirm = false;
        self
    }

    pub fn with_failing_sender(mut self, sender: Address) -> Self {
        self.failing_senders.insert(sender);
        self
    }

    /// Rejects every submission once `count` txs have been accepted.
    pub fn fail_sends_after(mut self, count: usize) -> Self {
        self.fail_sends_after = Some(count);
        self
    }

    pub fn with_failing_access_lists(mut self) -> Self {
        self.fail_access_lists = true;
        self
    }

    pub fn with_nonces(self, address: Address, latest: u64, pending: u64) -> Self {
        self.set_nonces(address, latest, pending);
        self
    }

    /// Overwrites the nonces of `address`, e.g. to leave a gap between rounds.
    pub fn set_nonces(&self, address: Address, latest: u64, pending: u64) {
        self.lock()
            .nonces
            .insert(address, MockNonces { latest, pending });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn sent(&self) -> Vec<SignedTx> {
        self.lock().sent.clone()
    }

    pub fn sent_by(&self, sender: Address) -> Vec<SignedTx> {
        self.lock()
            .sent
            .iter()
            .filter(|tx| tx.sender == sender)
            .cloned()
            .collect()
    }

    pub fn nonces(&self, address: Address) -> MockNonces {
        self.lock()
            .nonces
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    pub fn pending_nonce_queries(&self) -> u64 {
        self.lock().pending_nonce_queries
    }

    pub fn latest_nonce_queries(&self) -> u64 {
        self.lock().latest_nonce_queries
    }

    pub fn access_list_requests(&self) -> Vec<TransactionRequest> {
        self.lock().access_list_requests.clone()
    }

    pub fn wait_calls(&self) -> u64 {
        self.lock().wait_calls
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn chain_id(&self) -> Result<u64> {
        match self.chain_id {
            Some(id) => Ok(id),
            None => mock_err("eth_chainId unavailable"),
        }
    }

    async fn nonce_at(&self, address: Address, tag: NonceTag) -> Result<u64> {
        let mut state = self.lock();
        let nonces = state.nonces.get(&address).copied().unwrap_or_default();
        match tag {
            NonceTag::Latest => {
                state.latest_nonce_queries += 1;
                Ok(nonces.latest)
            }
            NonceTag::Pending => {
                state.pending_nonce_queries += 1;
                Ok(nonces.pending)
            }
        }
    }

    async fn suggest_fee_cap(&self) -> Result<u128> {
        match self.fee_cap {
            Some(fee) => Ok(fee),
            None => mock_err("eth_gasPrice unavailable"),
        }
    }

    async fn suggest_tip_cap(&self) -> Result<u128> {
        match self.tip_cap {
            Some(tip) => Ok(tip),
            None => mock_err("eth_maxPriorityFeePerGas unavailable"),
        }
    }

    async fn suggest_blob_fee(&self) -> Result<u128> {
        match self.blob_fee {
            Some(fee) => Ok(fee),
            None => mock_err("eth_blobBaseFee unavailable"),
        }
    }

    async fn block_gas_limit(&self) -> Result<u64> {
        Ok(self.block_gas_limit)
    }

    async fn balance_of(&self, _address: Address) -> Result<U256> {
        Ok(self.balance)
    }

    async fn create_access_list(&self, request: &TransactionRequest) -> Result<AccessList> {
        if self.fail_access_lists {
            return mock_err("eth_createAccessList unavailable");
        }
        self.lock().access_list_requests.push(request.clone());
        Ok(mock_access_list(request))
    }

    async fn send_raw_transaction(&self, tx: &SignedTx) -> Result<TxHash> {
        let mut state = self.lock();
        if self.failing_senders.contains(&tx.sender) {
            return mock_err("transaction rejected");
        }
        if self
            .fail_sends_after
            .is_some_and(|limit| state.sent.len() >= limit)
        {
            return mock_err("connection refused");
        }

        let nonce = tx.nonce();
        let nonces = state.nonces.entry(tx.sender).or_default();
        if nonce < nonces.latest {
            return mock_err("nonce too low");
        }
        if nonce > nonces.pending {
            return mock_err("nonce too high");
        }
        if nonce == nonces.pending {
            nonces.pending += 1;
        }
        if self.auto_mine {
            nonces.latest = nonces.pending;
        }
        state.sent.push(tx.clone());
        Ok(tx.tx_hash())
    }

    async fn wait_mined(&self, _tx_hash: TxHash, _timeout: Duration) -> Result<()> {
        self.lock().wait_calls += 1;
        if self.confirm {
            Ok(())
        } else {
            mock_err("timed out waiting for tx to be mined")
        }
    }
}
