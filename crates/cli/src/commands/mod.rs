mod airdrop;
pub mod common;
mod create;
mod spam;
mod txfuzz_subcommand;
mod unstuck;

use clap::Parser;

pub use airdrop::airdrop;
pub use create::create;
pub use spam::spam;
pub use txfuzz_subcommand::TxFuzzSubcommand;
pub use unstuck::unstuck;

#[derive(Parser, Debug)]
#[command(name = "txfuzz", version, about = "Fuzzer for sending spam transactions")]
pub struct TxFuzzCli {
    #[command(subcommand)]
    pub command: TxFuzzSubcommand,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

impl TxFuzzCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
