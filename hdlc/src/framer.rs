use bitvec::prelude::*;

pub const FLAG: u8 = 0b0111_1110;

const DEFAULT_PREAMBLE_FLAGS: usize = 30;
const DEFAULT_POSTAMBLE_FLAGS: usize = 10;

/// Transmit side of the link: stuffs a frame buffer and wraps it in flags.
///
/// Leading flags double as transmitter key-up delay, giving the remote
/// demodulator time to lock its clock. At least one flag is always sent on
/// each side of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framer {
    preamble_flags: usize,
    postamble_flags: usize,
}

impl Default for Framer {
    fn default() -> Self {
        Self::with_flags(DEFAULT_PREAMBLE_FLAGS, DEFAULT_POSTAMBLE_FLAGS)
    }
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(preamble_flags: usize, postamble_flags: usize) -> Self {
        Self {
            preamble_flags: preamble_flags.max(1),
            postamble_flags: postamble_flags.max(1),
        }
    }

    pub fn preamble_flags(&self) -> usize {
        self.preamble_flags
    }

    pub fn postamble_flags(&self) -> usize {
        self.postamble_flags
    }

    /// Builds the on-air bit stream for `bytes`: leading flags, the bytes
    /// LSB first with stuffing applied, then trailing flags.
    pub fn frame(&self, bytes: &[u8]) -> BitVec<u8, Lsb0> {
        let stuffed = bit_stuff(bytes.view_bits::<Lsb0>());
        let flags = self.preamble_flags + self.postamble_flags;

        let mut bits = BitVec::with_capacity(stuffed.len() + 8 * flags);
        for _ in 0..self.preamble_flags {
            bits.extend_from_bitslice(FLAG.view_bits::<Lsb0>());
        }
        bits.extend_from_bitslice(&stuffed);
        for _ in 0..self.postamble_flags {
            bits.extend_from_bitslice(FLAG.view_bits::<Lsb0>());
        }
        bits
    }
}

/// Performs HDLC bit stuffing: after five consecutive 1s, insert a 0.
pub fn bit_stuff(bits_in: &BitSlice<u8, Lsb0>) -> BitVec<u8, Lsb0> {
    let mut stuffed = BitVec::with_capacity(bits_in.len() + bits_in.len() / 5);
    let mut ones_count = 0;

    for bit in bits_in.iter().by_vals() {
        stuffed.push(bit);
        if bit {
            ones_count += 1;
            if ones_count == 5 {
                stuffed.push(false);
                ones_count = 0;
            }
        } else {
            ones_count = 0;
        }
    }
    stuffed
}

/// Performs HDLC bit destuffing: after five consecutive 1s, drop the
/// following 0.
pub fn bit_destuff(bits_in: &BitSlice<u8, Lsb0>) -> BitVec<u8, Lsb0> {
    let mut destuffed = BitVec::with_capacity(bits_in.len());
    let mut ones_count = 0;

    for bit in bits_in.iter().by_vals() {
        if ones_count == 5 {
            ones_count = 0;
            if !bit {
                continue;
            }
        }
        destuffed.push(bit);
        ones_count = if bit { ones_count + 1 } else { 0 };
    }
    destuffed
}
