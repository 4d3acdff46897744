use super::{Filler, ProgramGenerator};

const PUSH1: u8 = 0x60;
const PUSH32: u8 = 0x7f;
const STOP: u8 = 0x00;

/// Emits a random opcode stream: each filler byte is taken as an opcode, and `PUSHn`
/// opcodes consume their `n` immediate bytes from the filler as well.
#[derive(Clone, Copy, Debug)]
pub struct OpcodeGenerator {
    max_len: usize,
}

impl OpcodeGenerator {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }
}

impl Default for OpcodeGenerator {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProgramGenerator for OpcodeGenerator {
    fn generate_program(&self, filler: &mut Filler) -> Vec<u8> {
        let target = filler.u16() as usize % self.max_len + 1;
        let mut code = Vec::with_capacity(target + 32);
        while code.len() < target {
            let op = filler.byte();
            code.push(op);
            if (PUSH1..=PUSH32).contains(&op) {
                let n = (op - PUSH1 + 1) as usize;
                code.extend(filler.bytes(n));
            }
        }
        // half of the programs halt explicitly instead of running off the end
        if filler.bool() {
            code.push(STOP);
        }
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_filler() {
        let gen = OpcodeGenerator::default();
        let seed: Vec<u8> = (0..=255u8).collect();
        let a = gen.generate_program(&mut Filler::new(seed.clone()));
        let b = gen.generate_program(&mut Filler::new(seed));
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn push_immediates_are_complete() {
        // length prefix 0x0000 -> one opcode, then PUSH2 0xaabb, then "no STOP"
        let mut filler = Filler::new(vec![0x00, 0x00, 0x61, 0xaa, 0xbb, 0x00]);
        let code = OpcodeGenerator::new(16).generate_program(&mut filler);
        assert_eq!(code, vec![0x61, 0xaa, 0xbb]);
    }

    #[test]
    fn advances_the_cursor() {
        let gen = OpcodeGenerator::new(8);
        let mut filler = Filler::new((1..=64u8).collect());
        let first = gen.generate_program(&mut filler);
        let second = gen.generate_program(&mut filler);
        assert!(filler.position() > 0);
        assert_ne!(first, second);
    }
}
