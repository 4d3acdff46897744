//! Transaction shapes and the builders that fill them with fuzzed payloads.

mod builder;
mod fees;

use alloy::{consensus::TxEip1559, eips::eip2930::AccessList, primitives::TxKind};
use rand::Rng;
use strum::{Display, EnumIter};

use crate::{node::NodeClient, Result};

pub use builder::{random_address, random_code, random_tx, TxBuilder, TxConf};
pub use fees::{
    blob_fee_cap, get_caps, FeeCaps, FeeOverrides, DEFAULT_BLOB_FEE_CAP, DEFAULT_FEE_CAP, GWEI,
    OFFLINE_TIP_CAP,
};

/// Generated code longer than this is truncated before it is embedded in a tx.
pub const MAX_CODE_SIZE: usize = 128;

/// Gas limit given to every fuzzed transaction unless configured otherwise.
pub const DEFAULT_TX_GAS: u64 = 100_000;

/// Gas of a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// A legal transaction shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    Transfer,
    ContractCreation,
    FullAccessListTransfer,
    FullAccessListContractCreation,
}

impl Strategy {
    pub const NO_ACCESS_LIST: [Strategy; 2] = [Strategy::Transfer, Strategy::ContractCreation];

    pub const WITH_ACCESS_LIST: [Strategy; 4] = [
        Strategy::Transfer,
        Strategy::ContractCreation,
        Strategy::FullAccessListTransfer,
        Strategy::FullAccessListContractCreation,
    ];

    /// The strategies eligible for a run.
    pub fn registry(access_list: bool) -> &'static [Strategy] {
        if access_list {
            &Self::WITH_ACCESS_LIST
        } else {
            &Self::NO_ACCESS_LIST
        }
    }

    /// Picks uniformly from [`Strategy::registry`].
    pub fn choose<R: Rng + ?Sized>(rng: &mut R, access_list: bool) -> Self {
        let registry = Self::registry(access_list);
        registry[rng.gen_range(0..registry.len())]
    }

    pub fn creates_contract(self) -> bool {
        matches!(
            self,
            Strategy::ContractCreation | Strategy::FullAccessListContractCreation
        )
    }

    pub fn uses_access_list(self) -> bool {
        matches!(
            self,
            Strategy::FullAccessListTransfer | Strategy::FullAccessListContractCreation
        )
    }

    fn kind(self, conf: &TxConf) -> TxKind {
        if self.creates_contract() {
            TxKind::Create
        } else {
            TxKind::Call(conf.to)
        }
    }

    /// Assembles the final tx with the given access list.
    pub fn assemble(self, conf: &TxConf, access_list: AccessList) -> TxEip1559 {
        conf.eip1559(self.kind(conf), access_list)
    }

    /// Builds the tx for `conf`. Access-list strategies simulate a provisional tx on `node`
    /// and embed the returned list; simulation errors propagate.
    pub async fn build(self, conf: &TxConf, node: &dyn NodeClient) -> Result<TxEip1559> {
        let access_list = if self.uses_access_list() {
            node.create_access_list(&conf.request(self.kind(conf)))
                .await?
        } else {
            AccessList::default()
        };
        Ok(self.assemble(conf, access_list))
    }
}
