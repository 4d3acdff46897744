use tracing::info;
use txfuzz_core::{config::Config, recovery};

use super::common::SpamCliArgs;
use crate::error::CliError;

pub async fn airdrop(args: &SpamCliArgs) -> Result<(), CliError> {
    let config = args.build_config().await?;
    fund_pool(&config).await
}

async fn fund_pool(config: &Config) -> Result<(), CliError> {
    let value = recovery::airdrop_value(config.tx_per_account);
    recovery::airdrop(config, value)
        .await
        .map_err(CliError::from_run)?;
    info!("airdrop complete");
    Ok(())
}
