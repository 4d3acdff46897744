//! Funding pool accounts and resyncing stuck ones.

use alloy::{
    consensus::TxEip1559,
    eips::eip2930::AccessList,
    primitives::{Address, Bytes, TxKind, U256},
};
use tracing::{debug, error, info, warn};

use crate::{
    account::Account,
    config::Config,
    error::Error,
    node::{chain_id_or_default, NodeClient, NonceTag},
    strategy::{get_caps, FeeCaps, FeeOverrides, GWEI, TRANSFER_GAS},
    tx::FuzzTx,
    Result,
};

/// Replacement attempts per account before giving up.
pub const UNSTUCK_ATTEMPTS: usize = 10;

/// Accounts further behind than this cannot be fixed with a single replacement.
pub const MAX_NONCE_GAP: u64 = 10;

/// Factor applied to the suggested fee cap for replacement txs.
pub const UNSTUCK_FEE_MULTIPLIER: u128 = 100;

/// Funding per account for a standalone airdrop sized for `n` txs per account.
pub fn airdrop_value(n: u64) -> U256 {
    U256::from(n) * U256::from(100_000u64) * U256::from(GWEI)
}

/// Funding per account before each round of the spam loop.
pub fn spam_airdrop_value(n: u64) -> U256 {
    U256::from(n + 1) * U256::from(1_000_000u64) * U256::from(GWEI)
}

fn transfer(chain_id: u64, nonce: u64, to: Address, value: U256, fees: FeeCaps) -> TxEip1559 {
    TxEip1559 {
        chain_id,
        nonce,
        gas_limit: TRANSFER_GAS,
        max_fee_per_gas: fees.fee_cap,
        max_priority_fee_per_gas: fees.tip_cap,
        to: TxKind::Call(to),
        value,
        access_list: AccessList::default(),
        input: Bytes::new(),
    }
}

/// Sends `value` from the faucet to every pool account.
///
/// Fails up front if the faucet cannot pay for every transfer. The faucet nonce is read once
/// and incremented locally. The first failed submission aborts the airdrop. Only the last funding tx is awaited, and a missed confirmation is
/// logged.
pub async fn airdrop(config: &Config, value: U256) -> Result<()> {
    let node = config.node.as_ref();
    let faucet = &config.faucet;
    let chain_id = chain_id_or_default(node).await;
    let mut nonce = node.nonce_at(faucet.address(), NonceTag::Pending).await?;
    let fees = get_caps(Some(node), config.default_fee_cap, FeeOverrides::default()).await;

    let gas_cost = U256::from(TRANSFER_GAS) * U256::from(fees.fee_cap);
    let needed = U256::from(config.accounts.len()) * (value + gas_cost);
    let have = node.balance_of(faucet.address()).await?;
    if have < needed {
        return Err(Error::InsufficientBalance {
            address: faucet.address(),
            have,
            needed,
        });
    }
    info!(
        faucet = %faucet.address(),
        accounts = config.accounts.len(),
        "airdropping {value} wei per account"
    );

    let mut last_tx = None;
    for account in &config.accounts {
        let to = account.address();
        let tx = transfer(chain_id, nonce, to, value, fees);
        let signed = faucet.sign_tx(FuzzTx::Eip1559(tx))?;
        let tx_hash = node
            .send_raw_transaction(&signed)
            .await
            .inspect_err(|e| error!(%to, nonce, "airdrop failed: {e}"))?;
        debug!(%to, nonce, %tx_hash, "funded account");
        last_tx = Some(tx_hash);
        nonce += 1;
    }

    if let Some(tx_hash) = last_tx {
        if let Err(e) = node.wait_mined(tx_hash, config.confirm_timeout).await {
            warn!(%tx_hash, "waiting for airdrop to be mined failed: {e}");
        }
    }
    Ok(())
}

/// Resyncs the faucet and every pool account.
pub async fn unstuck(config: &Config) -> Result<()> {
    try_unstuck(config, &config.faucet).await?;
    for account in &config.accounts {
        try_unstuck(config, account).await?;
    }
    Ok(())
}

/// Replaces the tx at `account`'s latest nonce until its pending nonce catches up.
///
/// Returns `true` if a replacement was needed. Accounts more than [`MAX_NONCE_GAP`] behind
/// are skipped and reported as not fixed.
pub async fn try_unstuck(config: &Config, account: &Account) -> Result<bool> {
    let node = config.node.as_ref();
    let address = account.address();

    for attempt in 0..UNSTUCK_ATTEMPTS {
        let latest = node.nonce_at(address, NonceTag::Latest).await?;
        let pending = node.nonce_at(address, NonceTag::Pending).await?;
        if latest == pending {
            return Ok(attempt > 0);
        }
        if pending.abs_diff(latest) > MAX_NONCE_GAP {
            warn!(%address, latest, pending, "account too far behind to unstick, skipping");
            return Ok(false);
        }

        info!(%address, latest, pending, attempt, "unsticking account");
        let chain_id = chain_id_or_default(node).await;
        let fee_cap = replacement_fee_cap(node, config.default_fee_cap).await;
        let fees = FeeCaps {
            fee_cap,
            tip_cap: fee_cap,
        };
        let tx = transfer(chain_id, latest, address, U256::from(1), fees);
        let signed = account.sign_tx(FuzzTx::Eip1559(tx))?;
        let tx_hash = node.send_raw_transaction(&signed).await?;
        if let Err(e) = node.wait_mined(tx_hash, config.confirm_timeout).await {
            warn!(%address, %tx_hash, "replacement not mined: {e}");
        }
    }

    Err(Error::StuckAccount {
        address,
        attempts: UNSTUCK_ATTEMPTS,
    })
}

async fn replacement_fee_cap(node: &dyn NodeClient, default_fee_cap: u128) -> u128 {
    match node.suggest_fee_cap().await {
        Ok(fee_cap) => fee_cap.saturating_mul(UNSTUCK_FEE_MULTIPLIER),
        Err(e) => {
            debug!("fee cap suggestion failed: {e}");
            FeeCaps::offline(default_fee_cap).fee_cap
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        account::{AccountPool, DEFAULT_FAUCET_KEY},
        node::MockNode,
    };

    fn faucet() -> Account {
        Account::from_hex(DEFAULT_FAUCET_KEY).unwrap()
    }

    fn test_config(node: Arc<MockNode>, accounts: usize) -> Config {
        Config::builder(node, faucet())
            .accounts(AccountPool::static_pool(accounts).unwrap().into_accounts())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn airdrop_sequences_faucet_nonces() {
        let faucet = faucet().address();
        let node = Arc::new(MockNode::new().with_nonces(faucet, 4, 4));
        let config = test_config(node.clone(), 3);

        airdrop(&config, U256::from(1_000)).await.unwrap();

        let sent = node.sent_by(faucet);
        assert_eq!(sent.len(), 3);
        assert_eq!(node.pending_nonce_queries(), 1);
        for (i, (tx, account)) in sent.iter().zip(&config.accounts).enumerate() {
            assert_eq!(tx.nonce(), 4 + i as u64);
            assert_eq!(tx.tx.kind(), TxKind::Call(account.address()));
            let FuzzTx::Eip1559(inner) = &tx.tx else {
                panic!("expected a transfer");
            };
            assert_eq!(inner.gas_limit, TRANSFER_GAS);
            assert_eq!(inner.value, U256::from(1_000));
        }
        assert_eq!(node.wait_calls(), 1);
    }

    #[tokio::test]
    async fn airdrop_stops_on_first_failure() {
        let node = Arc::new(MockNode::new().fail_sends_after(2));
        let config = test_config(node.clone(), 5);

        assert!(airdrop(&config, U256::from(1)).await.is_err());
        assert_eq!(node.sent().len(), 2);
        assert_eq!(node.wait_calls(), 0);
    }

    #[tokio::test]
    async fn airdrop_requires_faucet_balance() {
        let node = Arc::new(MockNode::new().with_balance(U256::from(1_000)));
        let config = test_config(node.clone(), 2);

        let err = airdrop(&config, U256::from(1_000)).await.unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { have, .. } if have == U256::from(1_000)));
        assert!(node.sent().is_empty());
    }

    #[tokio::test]
    async fn airdrop_survives_missed_confirmation() {
        let node = Arc::new(MockNode::new().without_confirmations());
        let config = test_config(node.clone(), 2);
        airdrop(&config, U256::from(1)).await.unwrap();
        assert_eq!(node.sent().len(), 2);
    }

    #[tokio::test]
    async fn synced_account_is_left_alone() {
        let node = Arc::new(MockNode::new());
        let config = test_config(node.clone(), 1);
        assert!(!try_unstuck(&config, &config.accounts[0]).await.unwrap());
        assert!(node.sent().is_empty());
    }

    #[tokio::test]
    async fn stuck_account_gets_one_replacement() {
        let account = AccountPool::static_pool(1).unwrap().accounts()[0].clone();
        let node = Arc::new(MockNode::new().with_nonces(account.address(), 3, 5));
        let config = test_config(node.clone(), 1);

        assert!(try_unstuck(&config, &account).await.unwrap());

        let sent = node.sent_by(account.address());
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].nonce(), 3);
        assert_eq!(sent[0].tx.kind(), TxKind::Call(account.address()));
        let (fee_cap, tip_cap) = sent[0].tx.fee_caps();
        assert_eq!(fee_cap, 20 * GWEI * UNSTUCK_FEE_MULTIPLIER);
        assert_eq!(tip_cap, fee_cap);
        // the replacement is mined, so the account is synced again
        assert_eq!(node.nonces(account.address()).latest, 5);
    }

    #[tokio::test]
    async fn cleared_replacement_syncs_pending_to_latest_plus_one() {
        let account = AccountPool::static_pool(1).unwrap().accounts()[0].clone();
        let node = Arc::new(MockNode::new().with_nonces(account.address(), 3, 4));
        let config = test_config(node.clone(), 1);

        assert!(try_unstuck(&config, &account).await.unwrap());

        let sent = node.sent_by(account.address());
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].nonce(), 3);
        let nonces = node.nonces(account.address());
        assert_eq!(nonces.latest, 4);
        assert_eq!(nonces.pending, 3 + 1);
        // a second pass finds nothing to do
        assert!(!try_unstuck(&config, &account).await.unwrap());
        assert_eq!(node.sent_by(account.address()).len(), 1);
    }

    #[tokio::test]
    async fn replacement_that_never_clears_gives_up() {
        let account = AccountPool::static_pool(1).unwrap().accounts()[0].clone();
        let node = Arc::new(
            MockNode::new()
                .without_auto_mine()
                .with_nonces(account.address(), 3, 3),
        );
        let config = test_config(node.clone(), 1);
        // nothing queued: no replacement
        assert!(!try_unstuck(&config, &account).await.unwrap());

        // queue one tx that never gets mined
        let tx = transfer(1337, 3, Address::ZERO, U256::ZERO, FeeCaps::clamped(1, 1));
        node.send_raw_transaction(&account.sign_tx(FuzzTx::Eip1559(tx)).unwrap())
            .await
            .unwrap();
        assert_eq!(node.nonces(account.address()).pending, 4);

        // the replacement lands at the latest nonce but stays pending, so every attempt fails
        let err = try_unstuck(&config, &account).await.unwrap_err();
        assert!(matches!(err, Error::StuckAccount { attempts: UNSTUCK_ATTEMPTS, .. }));
        let sent = node.sent_by(account.address());
        assert_eq!(sent.len(), 1 + UNSTUCK_ATTEMPTS);
        assert!(sent[1..].iter().all(|tx| tx.nonce() == 3));
        assert_eq!(node.nonces(account.address()).latest, 3);
    }

    #[tokio::test]
    async fn far_behind_account_is_skipped() {
        let account = AccountPool::static_pool(1).unwrap().accounts()[0].clone();
        let node = Arc::new(MockNode::new().with_nonces(account.address(), 0, 50));
        let config = test_config(node.clone(), 1);
        assert!(!try_unstuck(&config, &account).await.unwrap());
        assert!(node.sent().is_empty());
    }

    #[tokio::test]
    async fn unstuck_covers_faucet_and_pool() {
        let pool = AccountPool::static_pool(2).unwrap();
        let stuck = pool.accounts()[1].address();
        let node = Arc::new(
            MockNode::new()
                .with_nonces(faucet().address(), 0, 1)
                .with_nonces(stuck, 7, 8),
        );
        let config = test_config(node.clone(), 2);

        unstuck(&config).await.unwrap();
        assert_eq!(node.sent_by(faucet().address()).len(), 1);
        assert_eq!(node.sent_by(stuck).len(), 1);
        assert_eq!(node.sent_by(stuck)[0].nonce(), 7);
        assert_eq!(node.sent().len(), 2);
    }

    #[test]
    fn airdrop_values_scale_with_n() {
        assert_eq!(airdrop_value(2), U256::from(200_000u64) * U256::from(GWEI));
        assert_eq!(spam_airdrop_value(0), U256::from(1_000_000u64) * U256::from(GWEI));
    }
}
