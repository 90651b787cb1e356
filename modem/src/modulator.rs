use bitvec::prelude::*;

/// Turns a bit stream into signed 16-bit PCM samples.
pub trait Modulator {
    /// Modulates `bits` in order.
    fn modulate_bits(&mut self, bits: &BitSlice<u8, Lsb0>) -> Vec<i16>;

    /// Modulates whole bytes, least significant bit first.
    fn modulate(&mut self, bytes: &[u8]) -> Vec<i16> {
        self.modulate_bits(bytes.view_bits::<Lsb0>())
    }
}
