use std::sync::Arc;

use rand::rngs::StdRng;
use tracing::{debug, warn};

use super::{SpamKind, WorkerStats};
use crate::{
    account::Account,
    config::{Config, NoncePolicy},
    generator::Filler,
    mutator::{derive_seed, Mutator},
    node::{chain_id_or_default, NonceTag},
    strategy::{FeeOverrides, TxBuilder},
    Result,
};

/// Random seed bytes drawn per worker when no corpus is configured.
pub const RANDOM_SEED_LEN: usize = 10_000;

/// Randomness owned by a single worker.
#[derive(Clone, Debug)]
pub struct WorkerSeed {
    pub filler: Filler,
    pub rng: StdRng,
}

/// Derives the filler and strategy RNG of worker `index` in spam round `round`.
///
/// With a corpus, a random entry is copied and mutated; otherwise random bytes are drawn and
/// mutated. Both come from a mutator seeded with
/// `derive_seed(derive_seed(config.seed, round), index)`.
pub fn seed_material(config: &Config, round: u64, index: usize) -> WorkerSeed {
    let round_seed = derive_seed(config.seed, round);
    let mut mutator = Mutator::new(derive_seed(round_seed, index as u64));
    let mut data = match config.corpus.as_ref().filter(|c| !c.is_empty()) {
        Some(corpus) => corpus.entries()[mutator.index(corpus.len())].data.clone(),
        None => {
            let mut random = vec![0u8; RANDOM_SEED_LEN];
            mutator.fill_bytes(&mut random);
            random
        }
    };
    mutator.mutate_bytes(&mut data);
    WorkerSeed {
        filler: Filler::new(data),
        rng: mutator.fork(),
    }
}

/// Sends `config.tx_per_account` transactions from `account`, then waits for the last one.
///
/// Any nonce, build, sign or submit error ends the worker. A missed confirmation is only
/// logged.
pub async fn send_transactions(
    config: Arc<Config>,
    account: Account,
    kind: SpamKind,
    seed: WorkerSeed,
) -> Result<WorkerStats> {
    let WorkerSeed {
        mut filler,
        mut rng,
    } = seed;
    let node = config.node.as_ref();
    let sender = account.address();
    let chain_id = chain_id_or_default(node).await;
    let builder = TxBuilder::new(node, config.generator.as_ref(), chain_id)
        .gas_limit(config.gas_limit)
        .default_fee_cap(config.default_fee_cap);

    let mut next_nonce = match config.nonce_policy {
        NoncePolicy::Local => Some(node.nonce_at(sender, NonceTag::Pending).await?),
        NoncePolicy::Network => None,
    };

    let mut stats = WorkerStats::default();
    let mut last_tx = None;
    for _ in 0..config.tx_per_account {
        let nonce = match next_nonce.as_mut() {
            Some(nonce) => {
                *nonce += 1;
                *nonce - 1
            }
            None => node.nonce_at(sender, NonceTag::Pending).await?,
        };

        let tx = match kind {
            SpamKind::Basic => {
                builder
                    .random_valid_tx(
                        &mut filler,
                        &mut rng,
                        sender,
                        nonce,
                        FeeOverrides::default(),
                        config.access_list,
                    )
                    .await
            }
            SpamKind::Blob => {
                builder
                    .random_blob_tx(
                        &mut filler,
                        &mut rng,
                        sender,
                        nonce,
                        FeeOverrides::default(),
                        config.access_list,
                    )
                    .await
            }
        }
        .inspect_err(|e| warn!(account = %sender, nonce, "could not create valid tx: {e}"))?;

        let signed = account.sign_tx(tx)?;
        let tx_hash = node
            .send_raw_transaction(&signed)
            .await
            .inspect_err(|e| warn!(account = %sender, nonce, "could not submit tx: {e}"))?;
        debug!(account = %sender, nonce, %tx_hash, "sent tx");

        stats.record(&signed.tx);
        last_tx = Some(tx_hash);
        tokio::time::sleep(config.submit_delay).await;
    }

    if let Some(tx_hash) = last_tx {
        match node.wait_mined(tx_hash, config.confirm_timeout).await {
            Ok(()) => stats.confirmed = true,
            Err(e) => {
                warn!(account = %sender, %tx_hash, "waiting for transactions to be mined failed: {e}")
            }
        }
    }
    Ok(stats)
}
