//! Software TNC: an AFSK1200 modem and an AX.25 link wired together.

pub mod config;
mod error;

pub use config::{Config, LinkConfig};
pub use error::TncError;

use ax25::{Ax25Link, Frame, FrameListener, LinkLayer, LinkStats};
use hdlc::{Deframer, Framer};
use modem::{Afsk1200, Demodulator};
use std::io::{self, Read, Write};

const READ_CHUNK: usize = 4096;

/// Receive and transmit path for one radio channel. Received frames go to
/// the listener synchronously, from inside [`Tnc::receive`].
pub struct Tnc<L: FrameListener> {
    modem: Afsk1200,
    link: Ax25Link<L>,
}

impl<L: FrameListener> Tnc<L> {
    pub fn new(config: &Config, listener: L) -> Result<Self, TncError> {
        let modem = Afsk1200::new(config.modem)?;
        let link = Ax25Link::with_parts(
            Deframer::with_capacity(config.link.max_frame_len),
            Framer::with_flags(config.link.tx_delay_flags, config.link.tx_tail_flags),
            listener,
        );

        log::info!(
            "TNC ready: {} baud at {} Hz, {}/{} flags, {}-byte frames",
            config.modem.baud,
            config.modem.sample_rate,
            config.link.tx_delay_flags,
            config.link.tx_tail_flags,
            config.link.max_frame_len
        );

        Ok(Self { modem, link })
    }

    /// Demodulates normalised samples in [-1, 1].
    pub fn receive(&mut self, samples: &[f32]) {
        self.modem.demodulate(samples, &mut self.link);
    }

    pub fn receive_pcm(&mut self, samples: &[i16]) {
        self.modem.demodulate_pcm(samples, &mut self.link);
    }

    /// Feeds raw signed 16-bit little-endian PCM from `reader` until end of
    /// input.
    pub fn receive_stream<R: Read>(&mut self, mut reader: R) -> io::Result<()> {
        let mut buf = vec![0u8; READ_CHUNK];
        let mut pending = Vec::with_capacity(READ_CHUNK + 1);
        let mut samples = Vec::with_capacity(READ_CHUNK / 2 + 1);

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            pending.extend_from_slice(&buf[..n]);

            // A read may end in the middle of a sample.
            let whole = pending.len() & !1;
            samples.clear();
            samples.extend(
                pending[..whole]
                    .chunks_exact(2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]])),
            );
            pending.drain(..whole);

            self.receive_pcm(&samples);
        }

        if !pending.is_empty() {
            log::debug!("Ignoring trailing odd byte of input");
        }
        Ok(())
    }

    pub fn transmit(&mut self, frame: &Frame) -> Result<Vec<i16>, TncError> {
        Ok(self.link.tx_frame(frame, &mut self.modem)?)
    }

    pub fn stats(&self) -> &LinkStats {
        self.link.stats()
    }

    pub fn into_listener(self) -> L {
        self.link.into_listener()
    }
}

/// Writes samples as raw signed 16-bit little-endian PCM.
pub fn write_pcm<W: Write>(samples: &[i16], mut writer: W) -> io::Result<()> {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    writer.write_all(&bytes)?;
    writer.flush()
}
