//! HDLC bit-level framing: flag synchronisation, bit stuffing and frame
//! buffer assembly.
//!
//! The receive side is [`Deframer`], a bit-at-a-time state machine that
//! hands back complete byte buffers. The transmit side is [`Framer`], which
//! stuffs a byte buffer and wraps it in flags.

mod deframer;
mod framer;

pub use deframer::{DEFAULT_CAPACITY, DeframeEvent, Deframer, ParserState};
pub use framer::{FLAG, Framer, bit_destuff, bit_stuff};
