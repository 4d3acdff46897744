use alloy::{
    consensus::{BlobTransactionSidecar, BlobTransactionSidecarVariant, SidecarBuilder, SimpleCoder, TxEip1559, TxEip4844, TxEip4844WithSidecar},
    eips::eip2930::AccessList,
    primitives::{Address, Bytes, TxKind, U256},
    rpc::types::{TransactionInput, TransactionRequest},
};
use rand::Rng;
use tracing::debug;

use super::{
    blob_fee_cap, get_caps, FeeCaps, FeeOverrides, Strategy, DEFAULT_FEE_CAP, DEFAULT_TX_GAS,
    MAX_CODE_SIZE,
};
use crate::{
    error::Error,
    generator::{Filler, ProgramGenerator},
    node::NodeClient,
    tx::FuzzTx,
    Result,
};

/// Highest precompile address targeted by transfers.
const MAX_PRECOMPILE: u8 = 0x0a;

/// Everything a strategy needs to assemble one transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxConf {
    pub nonce: u64,
    pub sender: Address,
    /// Recipient for call-shaped strategies; creations ignore it.
    pub to: Address,
    pub value: U256,
    pub gas_limit: u64,
    pub fees: FeeCaps,
    pub chain_id: u64,
    pub code: Bytes,
}

impl TxConf {
    pub fn eip1559(&self, to: TxKind, access_list: AccessList) -> TxEip1559 {
        TxEip1559 {
            chain_id: self.chain_id,
            nonce: self.nonce,
            gas_limit: self.gas_limit,
            max_fee_per_gas: self.fees.fee_cap,
            max_priority_fee_per_gas: self.fees.tip_cap,
            to,
            value: self.value,
            access_list,
            input: self.code.clone(),
        }
    }

    /// The provisional tx submitted to `eth_createAccessList`.
    pub fn request(&self, to: TxKind) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.sender),
            to: Some(to),
            nonce: Some(self.nonce),
            gas: Some(self.gas_limit),
            max_fee_per_gas: Some(self.fees.fee_cap),
            max_priority_fee_per_gas: Some(self.fees.tip_cap),
            value: Some(self.value),
            chain_id: Some(self.chain_id),
            input: TransactionInput::new(self.code.clone()),
            ..Default::default()
        }
    }
}

/// Picks a recipient: the zero address, a precompile, the sender itself or a random address.
pub fn random_address<R: Rng + ?Sized>(rng: &mut R, sender: Address) -> Address {
    match rng.gen_range(0..4) {
        0 => Address::ZERO,
        1 => Address::with_last_byte(rng.gen_range(1..=MAX_PRECOMPILE)),
        2 => sender,
        _ => {
            let mut bytes = [0u8; 20];
            rng.fill_bytes(&mut bytes);
            Address::from(bytes)
        }
    }
}

/// Generates a program from `filler`, truncated to [`MAX_CODE_SIZE`].
pub fn random_code(generator: &dyn ProgramGenerator, filler: &mut Filler) -> Bytes {
    let mut code = generator.generate_program(filler);
    code.truncate(MAX_CODE_SIZE);
    code.into()
}

/// A fee-market tx with random nonce, caps and chain id, built without a node.
pub fn random_tx<R: Rng + ?Sized>(
    generator: &dyn ProgramGenerator,
    filler: &mut Filler,
    rng: &mut R,
) -> FuzzTx {
    let code = random_code(generator, filler);
    let sender = random_address(rng, Address::ZERO);
    let conf = TxConf {
        nonce: rng.gen(),
        sender,
        to: random_address(rng, sender),
        value: U256::ZERO,
        gas_limit: DEFAULT_TX_GAS,
        fees: FeeCaps::offline(rng.gen::<u64>().into()),
        chain_id: rng.gen(),
        code,
    };
    let strategy = Strategy::choose(rng, false);
    FuzzTx::Eip1559(strategy.assemble(&conf, AccessList::default()))
}

/// Builds fuzzed transactions against one node.
#[derive(Clone, Copy)]
pub struct TxBuilder<'a> {
    node: &'a dyn NodeClient,
    generator: &'a dyn ProgramGenerator,
    chain_id: u64,
    gas_limit: u64,
    default_fee_cap: u128,
}

impl<'a> TxBuilder<'a> {
    pub fn new(
        node: &'a dyn NodeClient,
        generator: &'a dyn ProgramGenerator,
        chain_id: u64,
    ) -> Self {
        Self {
            node,
            generator,
            chain_id,
            gas_limit: DEFAULT_TX_GAS,
            default_fee_cap: DEFAULT_FEE_CAP,
        }
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn default_fee_cap(mut self, default_fee_cap: u128) -> Self {
        self.default_fee_cap = default_fee_cap;
        self
    }

    /// Draws the payload and recipient, then resolves fees.
    pub async fn tx_conf<R: Rng + ?Sized>(
        &self,
        filler: &mut Filler,
        rng: &mut R,
        sender: Address,
        nonce: u64,
        overrides: FeeOverrides,
    ) -> TxConf {
        let code = random_code(self.generator, filler);
        let to = random_address(rng, sender);
        let fees = get_caps(Some(self.node), self.default_fee_cap, overrides).await;
        TxConf {
            nonce,
            sender,
            to,
            value: U256::ZERO,
            gas_limit: self.gas_limit,
            fees,
            chain_id: self.chain_id,
            code,
        }
    }

    /// Builds a tx with a strategy drawn uniformly from [`Strategy::registry`].
    pub async fn random_valid_tx<R: Rng + ?Sized>(
        &self,
        filler: &mut Filler,
        rng: &mut R,
        sender: Address,
        nonce: u64,
        overrides: FeeOverrides,
        access_list: bool,
    ) -> Result<FuzzTx> {
        let strategy = Strategy::choose(rng, access_list);
        let conf = self.tx_conf(filler, rng, sender, nonce, overrides).await;
        debug!(%strategy, nonce, %sender, "building tx");
        Ok(FuzzTx::Eip1559(strategy.build(&conf, self.node).await?))
    }

    /// Builds an EIP-4844 tx whose payload is also packed into a blob sidecar.
    pub async fn random_blob_tx<R: Rng + ?Sized>(
        &self,
        filler: &mut Filler,
        rng: &mut R,
        sender: Address,
        nonce: u64,
        overrides: FeeOverrides,
        access_list: bool,
    ) -> Result<FuzzTx> {
        let conf = self.tx_conf(filler, rng, sender, nonce, overrides).await;
        // a blob tx must carry at least one blob
        let blob_data: &[u8] = if conf.code.is_empty() { &[0] } else { &conf.code[..] };
        let sidecar: BlobTransactionSidecar = SidecarBuilder::<SimpleCoder>::from_slice(blob_data)
            .build()
            .map_err(|e| Error::Sidecar(e.to_string()))?;

        let access_list = if access_list {
            self.node
                .create_access_list(&conf.request(TxKind::Call(conf.to)))
                .await?
        } else {
            AccessList::default()
        };
        let max_fee_per_blob_gas = blob_fee_cap(self.node).await;

        debug!(nonce, %sender, blobs = sidecar.blobs.len(), "building blob tx");
        let tx = TxEip4844 {
            chain_id: conf.chain_id,
            nonce: conf.nonce,
            gas_limit: conf.gas_limit,
            max_fee_per_gas: conf.fees.fee_cap,
            max_priority_fee_per_gas: conf.fees.tip_cap,
            to: conf.to,
            value: conf.value,
            access_list,
            blob_versioned_hashes: sidecar.versioned_hashes().collect(),
            max_fee_per_blob_gas,
            input: conf.code,
        };
        Ok(FuzzTx::Blob(TxEip4844WithSidecar::from_tx_and_sidecar(
            tx,
            BlobTransactionSidecarVariant::Eip4844(sidecar),
        )))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        generator::OpcodeGenerator,
        node::{mock::mock_access_list, MockNode},
        strategy::GWEI,
    };

    /// Emits `len` bytes of 0x5b regardless of the filler.
    struct FixedLen(usize);

    impl ProgramGenerator for FixedLen {
        fn generate_program(&self, _filler: &mut Filler) -> Vec<u8> {
            vec![0x5b; self.0]
        }
    }

    fn filler() -> Filler {
        Filler::new((0..=255).collect())
    }

    #[test]
    fn code_is_truncated() {
        let code = random_code(&FixedLen(4 * MAX_CODE_SIZE), &mut filler());
        assert_eq!(code.len(), MAX_CODE_SIZE);
        let code = random_code(&FixedLen(3), &mut filler());
        assert_eq!(code.len(), 3);
    }

    #[test]
    fn random_address_hits_every_class() {
        let mut rng = StdRng::seed_from_u64(1);
        let sender = Address::with_last_byte(0xee);
        let picks: Vec<_> = (0..400).map(|_| random_address(&mut rng, sender)).collect();
        assert!(picks.contains(&Address::ZERO));
        assert!(picks.contains(&sender));
        assert!(picks
            .iter()
            .any(|a| (1..=MAX_PRECOMPILE).any(|p| *a == Address::with_last_byte(p))));
    }

    #[test]
    fn offline_tx_keeps_tip_below_fee_cap() {
        let mut rng = StdRng::seed_from_u64(2);
        let generator = OpcodeGenerator::default();
        let mut filler = filler();
        for _ in 0..100 {
            let tx = random_tx(&generator, &mut filler, &mut rng);
            let (fee_cap, tip_cap) = tx.fee_caps();
            assert!(tip_cap <= fee_cap);
            assert!(tx.access_list().0.is_empty());
        }
    }

    #[tokio::test]
    async fn valid_tx_without_access_list() {
        let node = MockNode::new().with_fee_suggestions(3 * GWEI, 5 * GWEI);
        let generator = OpcodeGenerator::default();
        let builder = TxBuilder::new(&node, &generator, 1337);
        let mut rng = StdRng::seed_from_u64(3);
        let mut filler = filler();
        let sender = Address::with_last_byte(1);

        for nonce in 0..50 {
            let tx = builder
                .random_valid_tx(
                    &mut filler,
                    &mut rng,
                    sender,
                    nonce,
                    FeeOverrides::default(),
                    false,
                )
                .await
                .unwrap();
            let FuzzTx::Eip1559(inner) = &tx else {
                panic!("expected a fee-market tx");
            };
            assert_eq!(inner.nonce, nonce);
            assert_eq!(inner.chain_id, 1337);
            assert_eq!(inner.gas_limit, DEFAULT_TX_GAS);
            assert_eq!(inner.value, U256::ZERO);
            assert_eq!(inner.max_fee_per_gas, 3 * GWEI);
            assert_eq!(inner.max_priority_fee_per_gas, 3 * GWEI);
            assert!(inner.input.len() <= MAX_CODE_SIZE);
            assert!(inner.access_list.0.is_empty());
        }
        assert!(node.access_list_requests().is_empty());
    }

    #[tokio::test]
    async fn valid_tx_with_access_list_uses_simulation() {
        let node = MockNode::new();
        let generator = OpcodeGenerator::default();
        let builder = TxBuilder::new(&node, &generator, 1337);
        let mut rng = StdRng::seed_from_u64(4);
        let mut filler = filler();

        for nonce in 0..50 {
            let tx = builder
                .random_valid_tx(
                    &mut filler,
                    &mut rng,
                    Address::with_last_byte(1),
                    nonce,
                    FeeOverrides::default(),
                    true,
                )
                .await
                .unwrap();
            if !tx.access_list().0.is_empty() {
                let request = node.access_list_requests().pop().unwrap();
                assert_eq!(tx.access_list(), &mock_access_list(&request));
                assert_eq!(request.nonce, Some(nonce));
                assert_eq!(request.input.input(), Some(tx.input()));
            }
        }
        assert!(!node.access_list_requests().is_empty());
    }

    #[tokio::test]
    async fn blob_tx_commits_to_its_sidecar() {
        let node = MockNode::new();
        let generator = OpcodeGenerator::default();
        let builder = TxBuilder::new(&node, &generator, 1337).gas_limit(50_000);
        let mut rng = StdRng::seed_from_u64(5);

        let tx = builder
            .random_blob_tx(
                &mut filler(),
                &mut rng,
                Address::with_last_byte(1),
                9,
                FeeOverrides::default(),
                false,
            )
            .await
            .unwrap();
        let FuzzTx::Blob(blob) = tx else {
            panic!("expected a blob tx");
        };
        assert_eq!(blob.tx.nonce, 9);
        assert_eq!(blob.tx.gas_limit, 50_000);
        assert_eq!(blob.tx.max_fee_per_blob_gas, 2);
        assert!(!blob.tx.blob_versioned_hashes.is_empty());
        let hashes: Vec<_> = blob.sidecar.versioned_hashes().collect();
        assert_eq!(blob.tx.blob_versioned_hashes, hashes);
    }
}
