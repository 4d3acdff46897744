//! Per-account concurrent spam workers.

mod report;
mod spam_loop;
mod worker;

use std::sync::Arc;

use strum::{Display, EnumString};
use tracing::{error, info};

use crate::{config::Config, Error};

pub use report::{SpamReport, WorkerOutcome, WorkerStats};
pub use spam_loop::{spam_loop, SPAM_INTERVAL};
pub use worker::{seed_material, send_transactions, WorkerSeed, RANDOM_SEED_LEN};

/// Which builder the workers use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SpamKind {
    /// Transfers and contract creations, optionally with access lists.
    #[default]
    Basic,
    /// EIP-4844 transactions carrying the payload in a blob.
    Blob,
}

/// Runs one worker per pool account and waits for all of them.
///
/// Worker seeds are derived up front from the run seed, `round` and the account index, so a
/// run is reproducible regardless of how the tasks interleave, and each round draws fresh
/// inputs. A failing worker never stops the others; every outcome is recorded in the
/// returned report.
pub async fn spam_transactions(config: Arc<Config>, kind: SpamKind, round: u64) -> SpamReport {
    info!(
        round,
        "Spamming {} {kind} transactions per account on {} accounts with seed: {:#x}",
        config.tx_per_account,
        config.accounts.len(),
        config.seed
    );

    let mut handles = Vec::with_capacity(config.accounts.len());
    for (index, account) in config.accounts.iter().enumerate() {
        let seed = seed_material(&config, round, index);
        let handle = tokio::task::spawn(send_transactions(
            config.clone(),
            account.clone(),
            kind,
            seed,
        ));
        handles.push((index, account.address(), handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (index, address, handle) in handles {
        let result = handle.await.unwrap_or_else(|e| Err(Error::from(e)));
        if let Err(e) = &result {
            error!(account = %address, index, "worker failed: {e}");
        }
        outcomes.push(WorkerOutcome {
            index,
            address,
            result,
        });
    }
    SpamReport::new(outcomes)
}
