use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy::primitives::U256;
use tracing::{error, info};

use super::{spam_transactions, SpamKind};
use crate::{
    config::Config,
    recovery::{airdrop, unstuck},
    Result,
};

/// Pause between two spam rounds, roughly one slot.
pub const SPAM_INTERVAL: Duration = Duration::from_secs(12);

/// Repeats {unstuck, airdrop, spam, sleep `interval`} until `stop` is set.
///
/// A failed unstuck or airdrop ends the loop with its error; a failed spam round is logged
/// and the loop continues. Round `r` seeds its workers from `(config.seed, r)`.
pub async fn spam_loop(
    config: Arc<Config>,
    kind: SpamKind,
    airdrop_value: U256,
    interval: Duration,
    stop: Arc<AtomicBool>,
) -> Result<()> {
    let mut round = 0u64;
    while !stop.load(Ordering::Relaxed) {
        unstuck(&config).await?;
        airdrop(&config, airdrop_value).await?;

        let report = spam_transactions(config.clone(), kind, round).await;
        let creations = report.contract_creations();
        let access_lists = report.with_access_list();
        match report.into_result() {
            Ok(submitted) => info!(
                round,
                creations, access_lists, "round finished, {submitted} txs submitted"
            ),
            Err(e) => error!(round, "spam round failed: {e}"),
        }
        round += 1;

        if stop.load(Ordering::Relaxed) {
            break;
        }
        tokio::time::sleep(interval).await;
    }
    info!(rounds = round, "spam loop stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::TxKind;

    use super::*;
    use crate::{
        account::{Account, AccountPool, DEFAULT_FAUCET_KEY},
        node::MockNode,
    };

    fn test_config(node: Arc<MockNode>) -> Arc<Config> {
        let config = Config::builder(node, Account::from_hex(DEFAULT_FAUCET_KEY).unwrap())
            .accounts(AccountPool::static_pool(2).unwrap().into_accounts())
            .tx_per_account(3)
            .submit_delay(Duration::ZERO)
            .build()
            .unwrap();
        Arc::new(config)
    }

    #[tokio::test]
    async fn stopped_loop_does_nothing() {
        let node = Arc::new(MockNode::new());
        let stop = Arc::new(AtomicBool::new(true));
        spam_loop(
            test_config(node.clone()),
            SpamKind::Basic,
            U256::from(1),
            Duration::ZERO,
            stop,
        )
        .await
        .unwrap();
        assert!(node.sent().is_empty());
        assert_eq!(node.latest_nonce_queries(), 0);
    }

    #[tokio::test]
    async fn runs_rounds_until_stopped() {
        let node = Arc::new(MockNode::new());
        let config = test_config(node.clone());
        let faucet = config.faucet.address();
        let stop = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(spam_loop(
            config,
            SpamKind::Basic,
            U256::from(1),
            Duration::from_millis(5),
            stop.clone(),
        ));

        // two rounds: 2 airdrops + 6 spam txs each
        while node.sent().len() < 16 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        stop.store(true, Ordering::Relaxed);
        handle.await.unwrap().unwrap();

        let airdrops = node.sent_by(faucet);
        assert!(airdrops.len() >= 4);
        assert_eq!(airdrops.len() % 2, 0);
        // faucet and both pool accounts are resynced before every round
        let rounds = airdrops.len() as u64 / 2;
        assert_eq!(node.latest_nonce_queries(), 3 * rounds);
    }

    #[tokio::test]
    async fn account_stuck_by_a_round_is_recovered_next_round() {
        let node = Arc::new(MockNode::new());
        let config = test_config(node.clone());
        let stuck = config.accounts[1].address();
        let stop = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(spam_loop(
            config,
            SpamKind::Basic,
            U256::from(1),
            Duration::from_millis(20),
            stop.clone(),
        ));

        // first round done: 2 airdrops + 6 spam txs
        while node.sent().len() < 8 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        // leave a gap behind the account, as a dropped low-fee tx would
        node.set_nonces(stuck, 2, 3);
        while node.sent().len() < 17 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        stop.store(true, Ordering::Relaxed);
        handle.await.unwrap().unwrap();

        // three spam txs from the first round, then the replacement
        let sent = node.sent_by(stuck);
        assert_eq!(sent[3].nonce(), 2);
        assert_eq!(sent[3].tx.kind(), TxKind::Call(stuck));
        let (fee_cap, tip_cap) = sent[3].tx.fee_caps();
        assert_eq!(fee_cap, tip_cap);
        assert_eq!(sent[4].nonce(), 3);
    }

    #[tokio::test]
    async fn failed_airdrop_ends_the_loop() {
        let node = Arc::new(MockNode::new().fail_sends_after(0));
        let stop = Arc::new(AtomicBool::new(false));
        let res = spam_loop(
            test_config(node.clone()),
            SpamKind::Basic,
            U256::from(1),
            Duration::ZERO,
            stop,
        )
        .await;
        assert!(res.is_err());
        assert!(node.sent().is_empty());
    }
}
