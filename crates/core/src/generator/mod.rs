//! The program generator capability: turns seed bytes into EVM bytecode.

mod filler;
mod opcode;

pub use filler::Filler;
pub use opcode::OpcodeGenerator;

/// Produces a byte program from a filler. Implementations must be deterministic in the
/// filler's remaining bytes and advance its cursor by however much they consume.
pub trait ProgramGenerator: Send + Sync {
    fn generate_program(&self, filler: &mut Filler) -> Vec<u8>;
}
