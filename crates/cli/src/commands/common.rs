//! Arguments shared by every command that talks to a node.

use std::{path::PathBuf, sync::Arc};

use tracing::info;
use txfuzz_core::{
    account::{Account, AccountPool, DEFAULT_FAUCET_KEY},
    config::{setup_n, Config, NoncePolicy},
    corpus::Corpus,
    node::{NodeClient, RpcNode},
    strategy::DEFAULT_TX_GAS,
};
use url::Url;

use crate::{error::CliError, util::seed_or_random};

#[derive(Clone, Debug, clap::Args)]
pub struct SpamCliArgs {
    /// RPC URL of the node under test.
    #[arg(env = "RPC_URL", long, default_value = "http://127.0.0.1:8545")]
    pub rpc: Url,

    /// Private key of the faucet account.
    #[arg(
        env = "TXFUZZ_PRIVATE_KEY",
        long = "sk",
        long_help = "Private key of the faucet account that funds the account pool.",
        default_value = DEFAULT_FAUCET_KEY,
        hide_default_value = true
    )]
    pub sk: String,

    /// Seed for the payload generator.
    #[arg(
        env = "TXFUZZ_SEED",
        long,
        long_help = "Seed for the payload generator. 0 picks a random seed.",
        default_value_t = 0
    )]
    pub seed: u64,

    /// Number of pool accounts to spam from.
    #[arg(
        long,
        long_help = "Number of pool accounts to spam from. 0 (or more than the pool holds) uses the whole pool.",
        default_value_t = 0
    )]
    pub accounts: usize,

    /// Transactions per account and round.
    #[arg(
        long = "txcount",
        long_help = "Transactions per account and round. 0 sizes rounds to fill one block.",
        default_value_t = 0
    )]
    pub tx_count: u64,

    /// Gas limit of every fuzzed transaction.
    #[arg(long = "gaslimit", default_value_t = DEFAULT_TX_GAS)]
    pub gas_limit: u64,

    /// Directory of seed inputs.
    #[arg(long, long_help = "Directory of seed inputs; every file is one corpus entry.")]
    pub corpus: Option<PathBuf>,

    /// Never attach access lists.
    #[arg(long = "no-al")]
    pub no_access_list: bool,

    /// Track nonces locally instead of querying the node before every tx.
    #[arg(long = "local-nonce")]
    pub local_nonce: bool,
}

impl SpamCliArgs {
    pub fn nonce_policy(&self) -> NoncePolicy {
        if self.local_nonce {
            NoncePolicy::Local
        } else {
            NoncePolicy::Network
        }
    }

    /// Builds the run configuration, querying the node to size rounds when `--txcount` is 0.
    pub async fn build_config(&self) -> Result<Config, CliError> {
        let node: Arc<dyn NodeClient> = Arc::new(RpcNode::connect_http(self.rpc.clone()));
        self.build_config_with(node).await
    }

    pub async fn build_config_with(&self, node: Arc<dyn NodeClient>) -> Result<Config, CliError> {
        let faucet = Account::from_hex(&self.sk).map_err(CliError::FaucetKey)?;
        let pool = AccountPool::static_pool(AccountPool::sanitize_count(self.accounts))?;

        let tx_per_account = match self.tx_count {
            0 => setup_n(node.as_ref(), pool.len(), self.gas_limit)
                .await
                .map_err(CliError::from_run)?,
            n => n,
        };

        let corpus = match &self.corpus {
            Some(path) => Some(Corpus::from_dir(path).map_err(|source| CliError::Corpus {
                path: path.display().to_string(),
                source,
            })?),
            None => None,
        };

        let config = Config::builder(node, faucet)
            .accounts(pool.into_accounts())
            .tx_per_account(tx_per_account)
            .access_list(!self.no_access_list)
            .gas_limit(self.gas_limit)
            .seed(seed_or_random(self.seed))
            .corpus(corpus)
            .nonce_policy(self.nonce_policy())
            .build()?;
        info!(
            faucet = %config.faucet.address(),
            accounts = config.accounts.len(),
            tx_per_account = config.tx_per_account,
            access_list = config.access_list,
            "config ready"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use txfuzz_core::node::MockNode;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SpamCliArgs,
    }

    fn parse(args: &[&str]) -> SpamCliArgs {
        TestCli::parse_from(std::iter::once("txfuzz").chain(args.iter().copied())).args
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.rpc.as_str(), "http://127.0.0.1:8545/");
        assert_eq!(args.sk, DEFAULT_FAUCET_KEY);
        assert_eq!(args.gas_limit, DEFAULT_TX_GAS);
        assert_eq!(args.nonce_policy(), NoncePolicy::Network);
        assert!(!args.no_access_list);
    }

    #[tokio::test]
    async fn zero_txcount_is_sized_from_the_block() {
        let args = parse(&["--accounts", "10", "--seed", "5"]);
        let node = Arc::new(MockNode::new().with_block_gas_limit(30_000_000));
        let config = args.build_config_with(node).await.unwrap();
        assert_eq!(config.accounts.len(), 10);
        assert_eq!(config.tx_per_account, 30);
        assert_eq!(config.seed, 5);
        assert!(config.access_list);
    }

    #[tokio::test]
    async fn flags_reach_the_config() {
        let args = parse(&[
            "--accounts",
            "1000",
            "--txcount",
            "3",
            "--no-al",
            "--local-nonce",
        ]);
        let config = args
            .build_config_with(Arc::new(MockNode::new()))
            .await
            .unwrap();
        assert_eq!(config.accounts.len(), 100);
        assert_eq!(config.tx_per_account, 3);
        assert!(!config.access_list);
        assert_eq!(config.nonce_policy, NoncePolicy::Local);
        assert_ne!(config.seed, 0);
    }

    #[tokio::test]
    async fn corpus_dir_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("seed"), [0x60, 0x00]).unwrap();
        let args = parse(&[
            "--txcount",
            "1",
            "--corpus",
            dir.path().to_str().unwrap(),
        ]);
        let config = args
            .build_config_with(Arc::new(MockNode::new()))
            .await
            .unwrap();
        assert_eq!(config.corpus.map(|c| c.len()), Some(1));
    }

    #[tokio::test]
    async fn bad_faucet_key_is_reported() {
        let args = parse(&["--sk", "0x1234", "--txcount", "1"]);
        let err = args
            .build_config_with(Arc::new(MockNode::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::FaucetKey(_)));
    }
}
