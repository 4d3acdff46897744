mod commands;
mod error;
mod util;

use commands::{TxFuzzCli, TxFuzzSubcommand};
use txfuzz_core::spammer::SpamKind;
use util::init_tracing;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = TxFuzzCli::parse_args();
    init_tracing(&args.log_level);

    match args.command {
        TxFuzzSubcommand::Airdrop { args } => commands::airdrop(&args).await?,
        TxFuzzSubcommand::Spam { args } => commands::spam(&args, SpamKind::Basic).await?,
        TxFuzzSubcommand::Blobs { args } => commands::spam(&args, SpamKind::Blob).await?,
        TxFuzzSubcommand::Create { count } => commands::create(count),
        TxFuzzSubcommand::Unstuck { args } => commands::unstuck(&args).await?,
    }
    Ok(())
}
