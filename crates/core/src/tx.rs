use alloy::{
    consensus::{TxEip1559, TxEip4844WithSidecar, TxEnvelope},
    eips::{eip2718::Encodable2718, eip2930::AccessList},
    primitives::{Address, Bytes, TxHash, TxKind},
};

/// An unsigned transaction produced by one of the strategies.
#[derive(Clone, Debug, PartialEq)]
pub enum FuzzTx {
    Eip1559(TxEip1559),
    Blob(TxEip4844WithSidecar),
}

impl FuzzTx {
    pub fn nonce(&self) -> u64 {
        match self {
            FuzzTx::Eip1559(tx) => tx.nonce,
            FuzzTx::Blob(tx) => tx.tx.nonce,
        }
    }

    pub fn kind(&self) -> TxKind {
        match self {
            FuzzTx::Eip1559(tx) => tx.to,
            FuzzTx::Blob(tx) => TxKind::Call(tx.tx.to),
        }
    }

    pub fn input(&self) -> &Bytes {
        match self {
            FuzzTx::Eip1559(tx) => &tx.input,
            FuzzTx::Blob(tx) => &tx.tx.input,
        }
    }

    pub fn access_list(&self) -> &AccessList {
        match self {
            FuzzTx::Eip1559(tx) => &tx.access_list,
            FuzzTx::Blob(tx) => &tx.tx.access_list,
        }
    }

    /// Returns `(max_fee_per_gas, max_priority_fee_per_gas)`.
    pub fn fee_caps(&self) -> (u128, u128) {
        match self {
            FuzzTx::Eip1559(tx) => (tx.max_fee_per_gas, tx.max_priority_fee_per_gas),
            FuzzTx::Blob(tx) => (tx.tx.max_fee_per_gas, tx.tx.max_priority_fee_per_gas),
        }
    }

    pub fn is_contract_creation(&self) -> bool {
        self.kind().is_create()
    }
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Clone, Debug)]
pub struct SignedTx {
    pub sender: Address,
    pub tx: FuzzTx,
    pub envelope: TxEnvelope,
}

impl SignedTx {
    pub fn tx_hash(&self) -> TxHash {
        *self.envelope.tx_hash()
    }

    pub fn nonce(&self) -> u64 {
        self.tx.nonce()
    }

    /// EIP-2718 encoding; blob transactions are encoded in network form with their sidecar.
    pub fn encoded(&self) -> Vec<u8> {
        self.envelope.encoded_2718()
    }
}
