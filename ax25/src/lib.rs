//! AX.25 frame codec and the link layer that carries it over HDLC.
//!
//! Receive path: [`Ax25Link`] takes demodulated bits, lets the HDLC
//! deframer find buffers between flags, decodes them into [`Frame`]s and
//! hands each one to a [`FrameListener`]. Transmit path: a [`Frame`] is
//! encoded, stuffed, flagged and modulated with [`LinkLayer::tx_frame`].

pub mod address;
pub mod control;
mod error;
pub mod fcs;
mod frame;
mod link;
pub mod pid;

pub use address::{
    Address, AddressField, Callsign, CommandResponse, CompressedAddress, RepeaterPath,
};
pub use control::{ControlField, SupervisoryKind, UFrameType};
pub use error::{DecodeError, EncodeError, Malformed};
pub use frame::{FRMR_INFO_LEN, Frame, MAX_FRAME_LEN, MAX_INFO_LEN, MIN_FRAME_LEN};
pub use link::{Ax25Link, FrameListener, LinkLayer, LinkStats, ReceivedFrame};
pub use pid::Pid;
