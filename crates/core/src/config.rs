use std::{sync::Arc, time::Duration};

use tracing::info;

use crate::{
    account::Account,
    corpus::Corpus,
    error::Error,
    generator::{OpcodeGenerator, ProgramGenerator},
    node::NodeClient,
    strategy::{DEFAULT_FEE_CAP, DEFAULT_TX_GAS},
    Result,
};

/// Pause between two submissions of the same worker.
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(10);

/// How long a worker waits for its last tx to be mined.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Where workers take the nonce of their next transaction from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoncePolicy {
    /// Query the pending nonce before every submission.
    #[default]
    Network,
    /// Query once, then count locally. Faster, but drifts if the pool drops a tx.
    Local,
}

/// Immutable snapshot of one run, shared read-only by all workers.
#[derive(Clone)]
pub struct Config {
    pub node: Arc<dyn NodeClient>,
    pub faucet: Account,
    pub accounts: Vec<Account>,
    pub tx_per_account: u64,
    pub access_list: bool,
    pub gas_limit: u64,
    pub seed: u64,
    pub corpus: Option<Corpus>,
    pub generator: Arc<dyn ProgramGenerator>,
    pub nonce_policy: NoncePolicy,
    pub submit_delay: Duration,
    pub confirm_timeout: Duration,
    pub default_fee_cap: u128,
}

impl Config {
    pub fn builder(node: Arc<dyn NodeClient>, faucet: Account) -> ConfigBuilder {
        ConfigBuilder::new(node, faucet)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("faucet", &self.faucet.address())
            .field("accounts", &self.accounts.len())
            .field("tx_per_account", &self.tx_per_account)
            .field("access_list", &self.access_list)
            .field("gas_limit", &self.gas_limit)
            .field("seed", &self.seed)
            .field("corpus", &self.corpus.as_ref().map(|c| c.len()))
            .field("nonce_policy", &self.nonce_policy)
            .finish_non_exhaustive()
    }
}

pub struct ConfigBuilder {
    node: Arc<dyn NodeClient>,
    faucet: Account,
    accounts: Vec<Account>,
    tx_per_account: u64,
    access_list: bool,
    gas_limit: u64,
    seed: u64,
    corpus: Option<Corpus>,
    generator: Arc<dyn ProgramGenerator>,
    nonce_policy: NoncePolicy,
    submit_delay: Duration,
    confirm_timeout: Duration,
    default_fee_cap: u128,
}

impl ConfigBuilder {
    pub fn new(node: Arc<dyn NodeClient>, faucet: Account) -> Self {
        Self {
            node,
            faucet,
            accounts: vec![],
            tx_per_account: 1,
            access_list: true,
            gas_limit: DEFAULT_TX_GAS,
            seed: 0,
            corpus: None,
            generator: Arc::new(OpcodeGenerator::default()),
            nonce_policy: NoncePolicy::default(),
            submit_delay: DEFAULT_SUBMIT_DELAY,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            default_fee_cap: DEFAULT_FEE_CAP,
        }
    }

    pub fn accounts(mut self, accounts: Vec<Account>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn tx_per_account(mut self, tx_per_account: u64) -> Self {
        self.tx_per_account = tx_per_account;
        self
    }

    pub fn access_list(mut self, access_list: bool) -> Self {
        self.access_list = access_list;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn corpus(mut self, corpus: Option<Corpus>) -> Self {
        self.corpus = corpus;
        self
    }

    pub fn generator(mut self, generator: Arc<dyn ProgramGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn nonce_policy(mut self, nonce_policy: NoncePolicy) -> Self {
        self.nonce_policy = nonce_policy;
        self
    }

    pub fn submit_delay(mut self, submit_delay: Duration) -> Self {
        self.submit_delay = submit_delay;
        self
    }

    pub fn confirm_timeout(mut self, confirm_timeout: Duration) -> Self {
        self.confirm_timeout = confirm_timeout;
        self
    }

    pub fn default_fee_cap(mut self, default_fee_cap: u128) -> Self {
        self.default_fee_cap = default_fee_cap;
        self
    }

    pub fn build(self) -> Result<Config> {
        if self.accounts.is_empty() {
            return Err(Error::config("account pool is empty"));
        }
        if self.gas_limit == 0 {
            return Err(Error::config("gas limit must be non-zero"));
        }
        // an empty corpus would leave workers nothing to draw from
        let corpus = self.corpus.filter(|c| !c.is_empty());

        Ok(Config {
            node: self.node,
            faucet: self.faucet,
            accounts: self.accounts,
            tx_per_account: self.tx_per_account,
            access_list: self.access_list,
            gas_limit: self.gas_limit,
            seed: self.seed,
            corpus,
            generator: self.generator,
            nonce_policy: self.nonce_policy,
            submit_delay: self.submit_delay,
            confirm_timeout: self.confirm_timeout,
            default_fee_cap: self.default_fee_cap,
        })
    }
}

/// Number of txs per account that fills one block: `block gas limit / gas_limit / accounts`,
/// at least 1.
pub async fn setup_n(node: &dyn NodeClient, accounts: usize, gas_limit: u64) -> Result<u64> {
    if accounts == 0 || gas_limit == 0 {
        return Err(Error::config("cannot size a run without accounts or gas"));
    }
    let block_gas_limit = node.block_gas_limit().await?;
    let n = (block_gas_limit / gas_limit / accounts as u64).max(1);
    info!(block_gas_limit, accounts, gas_limit, "sending {n} txs per account");
    Ok(n)
}
