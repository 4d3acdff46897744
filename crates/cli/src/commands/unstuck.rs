use tracing::info;

use super::common::SpamCliArgs;
use crate::error::CliError;

pub async fn unstuck(args: &SpamCliArgs) -> Result<(), CliError> {
    let config = args.build_config().await?;
    txfuzz_core::recovery::unstuck(&config)
        .await
        .map_err(CliError::from_run)?;
    info!("all accounts are in sync");
    Ok(())
}
