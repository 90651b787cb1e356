use crate::error::{DecodeError, EncodeError};
use crate::fcs;
use crate::frame::Frame;
use bitvec::prelude::*;
use hdlc::{DeframeEvent, Deframer, Framer};
use modem::{BitSink, Modulator};
use std::sync::mpsc;

/// Receives every frame that makes it through the link layer. Frames whose
/// FCS does not match are still delivered, with `valid` unset and the
/// mismatch in `error`.
pub trait FrameListener {
    fn on_frame_ready(&mut self, frame: Frame, valid: bool, error: Option<DecodeError>);
}

impl<F> FrameListener for F
where
    F: FnMut(Frame, bool, Option<DecodeError>),
{
    fn on_frame_ready(&mut self, frame: Frame, valid: bool, error: Option<DecodeError>) {
        self(frame, valid, error)
    }
}

/// What a channel listener sends for each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    pub frame: Frame,
    pub valid: bool,
    pub error: Option<DecodeError>,
}

impl FrameListener for mpsc::Sender<ReceivedFrame> {
    fn on_frame_ready(&mut self, frame: Frame, valid: bool, error: Option<DecodeError>) {
        let received = ReceivedFrame {
            frame,
            valid,
            error,
        };
        if self.send(received).is_err() {
            log::warn!("Frame receiver hung up, dropping frame");
        }
    }
}

/// Bit-level link layer: takes demodulated bits in through [`BitSink`] and
/// turns frames into modulated audio on the way out.
pub trait LinkLayer: BitSink {
    /// Encodes `frame` and wraps it into the stuffed, flagged bit stream.
    /// Frames that a link with the same settings could not receive are
    /// rejected.
    fn prepare_frame(&self, frame: &Frame) -> Result<BitVec<u8, Lsb0>, EncodeError>;

    fn tx_frame<M: Modulator>(
        &self,
        frame: &Frame,
        modulator: &mut M,
    ) -> Result<Vec<i16>, EncodeError> {
        let bits = self.prepare_frame(frame)?;
        Ok(modulator.modulate_bits(&bits))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Frames handed to the listener, valid or not.
    pub frames: u64,
    pub checksum_failures: u64,
    /// Buffers between flags that did not decode to a frame.
    pub malformed: u64,
    pub sync_losses: u64,
    pub overflows: u64,
}

/// AX.25 over HDLC: deframes incoming bits, decodes the buffers and
/// notifies the listener inline, on the caller's thread.
#[derive(Debug)]
pub struct Ax25Link<L> {
    deframer: Deframer,
    framer: Framer,
    listener: L,
    stats: LinkStats,
}

impl<L: FrameListener> Ax25Link<L> {
    pub fn new(listener: L) -> Self {
        Self::with_parts(Deframer::new(), Framer::default(), listener)
    }

    pub fn with_parts(deframer: Deframer, framer: Framer, listener: L) -> Self {
        Self {
            deframer,
            framer,
            listener,
            stats: LinkStats::default(),
        }
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    fn deliver(&mut self, buffer: Vec<u8>) {
        let frame = match Frame::parse(&buffer) {
            Ok(frame) => frame,
            Err(reason) => {
                self.stats.malformed += 1;
                log::debug!("Dropping {}-byte buffer: {reason}", buffer.len());
                return;
            }
        };

        let error = fcs::verify(&buffer).err();
        self.stats.frames += 1;
        if error.is_some() {
            self.stats.checksum_failures += 1;
        }
        self.listener.on_frame_ready(frame, error.is_none(), error);
    }
}

impl<L: FrameListener> BitSink for Ax25Link<L> {
    fn rxbit(&mut self, bit: bool) {
        match self.deframer.rxbit(bit) {
            Some(DeframeEvent::Frame(buffer)) => self.deliver(buffer),
            Some(DeframeEvent::Abort) => self.stats.sync_losses += 1,
            Some(DeframeEvent::Overflow) => self.stats.overflows += 1,
            None => {}
        }
    }
}

impl<L: FrameListener> LinkLayer for Ax25Link<L> {
    fn prepare_frame(&self, frame: &Frame) -> Result<BitVec<u8, Lsb0>, EncodeError> {
        let bytes = frame.encode()?;
        let max = self.deframer.capacity();
        if bytes.len() > max {
            return Err(EncodeError::FrameTooLong {
                len: bytes.len(),
                max,
            });
        }
        Ok(self.framer.frame(&bytes))
    }
}
