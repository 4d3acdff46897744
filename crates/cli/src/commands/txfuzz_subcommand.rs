use clap::Subcommand;

use super::common::SpamCliArgs;

#[derive(Debug, Subcommand)]
pub enum TxFuzzSubcommand {
    #[command(name = "airdrop", about = "Airdrops to a list of accounts")]
    Airdrop {
        #[command(flatten)]
        args: Box<SpamCliArgs>,
    },

    #[command(
        name = "spam",
        about = "Send spam transactions",
        long_about = "Fund the account pool, then send fuzzed transfers and contract creations from every account each round until CTRL-C."
    )]
    Spam {
        #[command(flatten)]
        args: Box<SpamCliArgs>,
    },

    #[command(
        name = "blobs",
        about = "Send blob spam transactions",
        long_about = "Like `spam`, but every transaction is an EIP-4844 blob transaction carrying the fuzzed payload."
    )]
    Blobs {
        #[command(flatten)]
        args: Box<SpamCliArgs>,
    },

    #[command(name = "create", about = "Create ephemeral accounts")]
    Create {
        /// Number of accounts to generate.
        #[arg(long, default_value_t = 100)]
        count: usize,
    },

    #[command(name = "unstuck", about = "Tries to unstuck an account")]
    Unstuck {
        #[command(flatten)]
        args: Box<SpamCliArgs>,
    },
}
