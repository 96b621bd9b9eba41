use rand::Rng;

/// Supplies the bytes consumed by `Cxkk`.
pub trait RandomSource {
    fn next_byte(&mut self) -> u8;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_byte(&mut self) -> u8 {
        self.gen::<u8>()
    }
}

/// Replays a fixed list of bytes, starting over when it runs out.
#[derive(Debug, Clone)]
pub struct Sequence {
    bytes: Vec<u8>,
    next: usize,
}

impl Sequence {
    /// Panics if `bytes` is empty.
    pub fn new(bytes: Vec<u8>) -> Sequence {
        assert!(!bytes.is_empty(), "a byte sequence needs at least one byte");
        Sequence { bytes, next: 0 }
    }
}

impl RandomSource for Sequence {
    fn next_byte(&mut self) -> u8 {
        let byte = self.bytes[self.next];
        self.next = (self.next + 1) % self.bytes.len();
        byte
    }
}
