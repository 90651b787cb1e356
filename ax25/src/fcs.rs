//! Frame check sequence: CRC-16/X.25 over address through info, sent low
//! byte first.

use crate::error::{DecodeError, Malformed};
use crc_any::CRCu16;

/// Register left behind by the reflected CRC after it has consumed a frame
/// together with its own, correct, FCS.
pub const RESIDUE: u16 = 0xF0B8;

pub fn compute(bytes: &[u8]) -> u16 {
    let mut crc = CRCu16::crc16_x25();
    crc.digest(bytes);
    crc.get_crc()
}

/// Appends the FCS of everything already in `frame`.
pub fn append(frame: &mut Vec<u8>) {
    let crc = compute(frame);
    frame.extend_from_slice(&crc.to_le_bytes());
}

/// Runs the CRC across the whole frame, FCS included, and compares the
/// register with [`RESIDUE`].
pub fn is_valid(frame: &[u8]) -> bool {
    // get_crc() has the final complement applied; undo it to see the register.
    compute(frame) ^ 0xFFFF == RESIDUE
}

/// The trailing two bytes of `frame`, read big-endian.
pub fn received(frame: &[u8]) -> Option<u16> {
    let (_, tail) = frame.split_last_chunk::<2>()?;
    Some(u16::from_be_bytes(*tail))
}

pub fn verify(frame: &[u8]) -> Result<(), DecodeError> {
    let received = received(frame).ok_or(Malformed::TooShort(frame.len()))?;
    if is_valid(frame) {
        return Ok(());
    }
    let body = &frame[..frame.len() - 2];
    Err(DecodeError::ChecksumMismatch {
        received,
        computed: compute(body).swap_bytes(),
    })
}
