use std::str::FromStr;

use alloy::{
    consensus::{SignableTransaction, TxEip4844Variant, TxEnvelope},
    hex::ToHexExt,
    primitives::{keccak256, Address},
    signers::{local::PrivateKeySigner, SignerSync},
};
use tracing::info;

use crate::{
    tx::{FuzzTx, SignedTx},
    Result,
};

/// Number of accounts in the pre-provisioned pool.
pub const STATIC_POOL_SIZE: usize = 100;

/// Fixed seed the static pool keys are derived from.
pub const STATIC_POOL_SEED: &[u8] = b"txfuzz/static-account-pool";

/// Default faucet key (first prefunded dev account of anvil/geth --dev style chains).
pub const DEFAULT_FAUCET_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// A signing identity. The nonce is never cached here; the node is authoritative.
#[derive(Clone, Debug)]
pub struct Account {
    signer: PrivateKeySigner,
}

impl Account {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn from_hex(key: &str) -> Result<Self> {
        Ok(Self::new(PrivateKeySigner::from_str(key)?))
    }

    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn private_key_hex(&self) -> String {
        format!("0x{}", self.signer.to_bytes().encode_hex())
    }

    /// Signs `tx` with this account's key. Pure in the tx, its embedded chain id, and the key.
    pub fn sign_tx(&self, tx: FuzzTx) -> Result<SignedTx> {
        let envelope = match tx.clone() {
            FuzzTx::Eip1559(inner) => {
                let signature = self.signer.sign_hash_sync(&inner.signature_hash())?;
                TxEnvelope::Eip1559(inner.into_signed(signature))
            }
            FuzzTx::Blob(inner) => {
                let inner = TxEip4844Variant::TxEip4844WithSidecar(inner);
                let signature = self.signer.sign_hash_sync(&inner.signature_hash())?;
                TxEnvelope::Eip4844(inner.into_signed(signature))
            }
        };
        Ok(SignedTx {
            sender: self.address(),
            tx,
            envelope,
        })
    }
}

/// Ordered set of worker accounts.
#[derive(Clone, Debug, Default)]
pub struct AccountPool {
    accounts: Vec<Account>,
}

impl AccountPool {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    /// Derives `count` keys from `seed`: key `i` is `keccak256(seed ++ i)`.
    pub fn from_seed(seed: &[u8], count: usize) -> Result<Self> {
        let accounts = (0..count as u64)
            .map(|i| {
                let mut preimage = seed.to_vec();
                preimage.extend_from_slice(&i.to_be_bytes());
                let key = keccak256(&preimage);
                Ok(Account::new(PrivateKeySigner::from_bytes(&key)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(accounts))
    }

    /// The first `count` accounts of the static pool. See [`AccountPool::sanitize_count`].
    pub fn static_pool(count: usize) -> Result<Self> {
        Self::from_seed(STATIC_POOL_SEED, Self::sanitize_count(count))
    }

    /// A count of zero, or one larger than the static pool, selects the whole pool.
    pub fn sanitize_count(requested: usize) -> usize {
        if requested == 0 || requested > STATIC_POOL_SIZE {
            info!("Sanitizing count flag from {requested} to {STATIC_POOL_SIZE}");
            STATIC_POOL_SIZE
        } else {
            requested
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn into_accounts(self) -> Vec<Account> {
        self.accounts
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.accounts.iter().map(|a| a.address()).collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Generates `count` fresh random accounts.
pub fn create_accounts(count: usize) -> Vec<Account> {
    (0..count).map(|_| Account::random()).collect()
}
