use alloy::primitives::keccak256;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Upper bound of mutation rounds applied by a single [`Mutator::mutate_bytes`] call.
const MAX_MUTATION_ROUNDS: usize = 8;

/// Byte values that tend to hit edge cases in EVM decoding.
const INTERESTING_BYTES: [u8; 10] = [0x00, 0x01, 0x20, 0x5b, 0x60, 0x7f, 0x80, 0xf3, 0xfe, 0xff];

/// Derives an independent 64-bit seed for stream `index` of a run seeded with `run_seed`.
///
/// The result is the first 8 bytes of `keccak256(run_seed ++ index)` (both big-endian),
/// so each worker gets its own reproducible stream without sharing an RNG.
pub fn derive_seed(run_seed: u64, index: u64) -> u64 {
    let mut preimage = [0u8; 16];
    preimage[..8].copy_from_slice(&run_seed.to_be_bytes());
    preimage[8..].copy_from_slice(&index.to_be_bytes());
    let hash = keccak256(preimage);
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(seed)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mutation {
    FlipBit,
    RandomByte,
    InterestingByte,
    InsertByte,
    DeleteByte,
    DuplicateChunk,
    SwapBytes,
    Truncate,
}

const MUTATIONS: [Mutation; 8] = [
    Mutation::FlipBit,
    Mutation::RandomByte,
    Mutation::InterestingByte,
    Mutation::InsertByte,
    Mutation::DeleteByte,
    Mutation::DuplicateChunk,
    Mutation::SwapBytes,
    Mutation::Truncate,
];

/// Seeded byte source and mutator.
#[derive(Clone, Debug)]
pub struct Mutator {
    rng: StdRng,
}

impl Mutator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Splits off an independent RNG, e.g. for strategy selection.
    pub fn fork(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.gen())
    }

    /// Applies between one and [`MAX_MUTATION_ROUNDS`] random mutations in place.
    pub fn mutate_bytes(&mut self, data: &mut Vec<u8>) {
        let rounds = self.rng.gen_range(1..=MAX_MUTATION_ROUNDS);
        for _ in 0..rounds {
            let mutation = MUTATIONS[self.rng.gen_range(0..MUTATIONS.len())];
            self.apply(mutation, data);
        }
    }

    fn apply(&mut self, mutation: Mutation, data: &mut Vec<u8>) {
        if data.is_empty() {
            data.push(self.rng.gen());
            return;
        }
        let len = data.len();
        let pos = self.rng.gen_range(0..len);
        match mutation {
            Mutation::FlipBit => data[pos] ^= 1 << self.rng.gen_range(0..8),
            Mutation::RandomByte => data[pos] = self.rng.gen(),
            Mutation::InterestingByte => {
                data[pos] = INTERESTING_BYTES[self.rng.gen_range(0..INTERESTING_BYTES.len())]
            }
            Mutation::InsertByte => data.insert(pos, self.rng.gen()),
            Mutation::DeleteByte => {
                if len > 1 {
                    data.remove(pos);
                }
            }
            Mutation::DuplicateChunk => {
                let end = self.rng.gen_range(pos..len) + 1;
                let chunk = data[pos..end].to_vec();
                let at = self.rng.gen_range(0..=len);
                data.splice(at..at, chunk);
            }
            Mutation::SwapBytes => {
                let other = self.rng.gen_range(0..len);
                data.swap(pos, other);
            }
            // keep at least half of the input
            Mutation::Truncate => data.truncate(pos.max(len / 2).max(1)),
        }
    }
}
