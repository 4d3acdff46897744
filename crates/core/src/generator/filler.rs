/// A wrapping read cursor over seed bytes.
///
/// One filler serves all of a worker's transactions: every read advances the cursor, and
/// reads past the end start over from the first byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filler {
    data: Vec<u8>,
    pointer: usize,
}

impl Filler {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pointer: 0 }
    }

    /// Next byte; an empty filler yields zeroes.
    pub fn byte(&mut self) -> u8 {
        if self.data.is_empty() {
            return 0;
        }
        let b = self.data[self.pointer];
        self.pointer = (self.pointer + 1) % self.data.len();
        b
    }

    pub fn bytes(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.byte()).collect()
    }

    pub fn bool(&mut self) -> bool {
        self.byte() & 1 == 1
    }

    pub fn u16(&mut self) -> u16 {
        u16::from_be_bytes([self.byte(), self.byte()])
    }

    pub fn u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        buf.iter_mut().for_each(|b| *b = self.byte());
        u64::from_be_bytes(buf)
    }

    pub fn position(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
