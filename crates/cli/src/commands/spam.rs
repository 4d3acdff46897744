use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{info, warn};
use txfuzz_core::{
    recovery::spam_airdrop_value,
    spammer::{spam_loop, SpamKind, SPAM_INTERVAL},
};

use super::common::SpamCliArgs;
use crate::error::CliError;

/// Runs the spam loop until CTRL-C. The current round finishes before the loop exits.
pub async fn spam(args: &SpamCliArgs, kind: SpamKind) -> Result<(), CliError> {
    let config = Arc::new(args.build_config().await?);
    let airdrop_value = spam_airdrop_value(config.tx_per_account);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_on_ctrl_c = stop.clone();
    tokio::task::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("CTRL-C received, stopping after the current round");
                stop_on_ctrl_c.store(true, Ordering::Relaxed);
            }
            Err(e) => warn!("failed to listen for CTRL-C: {e}"),
        }
    });

    spam_loop(config, kind, airdrop_value, SPAM_INTERVAL, stop)
        .await
        .map_err(CliError::from_run)
}
