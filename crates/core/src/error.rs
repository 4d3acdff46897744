use alloy::{
    primitives::{Address, U256},
    providers::PendingTransactionError,
    signers::{self, k256::ecdsa, local::LocalSignerError},
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read corpus")]
    Io(#[from] std::io::Error),

    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),

    #[error("failed to watch pending tx: {0}")]
    PendingTx(#[from] PendingTransactionError),

    #[error("signer failed to sign hash")]
    Signer(#[from] signers::Error),

    #[error("invalid private key")]
    PrivateKey(#[from] LocalSignerError),

    #[error("derived key is not a valid secp256k1 scalar")]
    DerivedKey(#[from] ecdsa::Error),

    #[error("failed to build blob sidecar: {0}")]
    Sidecar(String),

    #[error("latest block not found")]
    BlockMissing,

    #[error("spam worker task failed: {0}")]
    Join(#[from] JoinError),

    #[error("faucet {address} has insufficient balance to fund all accounts. Have {have}, needed {needed}")]
    InsufficientBalance {
        address: Address,
        have: U256,
        needed: U256,
    },

    #[error("account {address} is still stuck after {attempts} replacement attempts")]
    StuckAccount { address: Address, attempts: usize },
}

impl Error {
    pub fn config(msg: impl ToString) -> Self {
        Self::Config(msg.to_string())
    }

    /// True for failures that came back from the node rather than from local construction.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::PendingTx(_) | Self::BlockMissing)
    }
}
