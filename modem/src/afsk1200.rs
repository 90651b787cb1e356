use crate::{BitSink, Demodulator, Modulator};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::{error, f64::consts::PI, fmt};

/// One bit period of the fixed-point bit clock.
const PHASE_WRAP: u32 = 0x10000;

/// The line idles on mark, the tone the transmitter starts from.
const IDLE_SYMBOL: u8 = 1;

/// Construction-time parameters of the modem. None of them can change once
/// the modem is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Afsk1200Config {
    pub sample_rate: u32,
    pub baud: u32,
    /// Tone used for "mark", in Hz.
    pub mark_freq: u32,
    /// Tone used for "space", in Hz.
    pub space_freq: u32,
    /// The correlator runs once every `subsample` input samples.
    pub subsample: u32,
}

impl Default for Afsk1200Config {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            baud: 1200,
            mark_freq: 1200,
            space_freq: 2200,
            subsample: 2,
        }
    }
}

impl Afsk1200Config {
    /// Length of the correlator and tone tables. Zero if `baud` is zero.
    pub fn samples_per_bit(&self) -> usize {
        self.sample_rate.checked_div(self.baud).unwrap_or(0) as usize
    }

    fn validate(&self) -> Result<(), ModemError> {
        let invalid = |reason: String| Err(ModemError::InvalidConfig(reason));

        if self.baud == 0 {
            return invalid("baud rate must be positive".into());
        }
        let samples_per_bit = self.samples_per_bit();
        if samples_per_bit < 4 {
            return invalid(format!(
                "{} Hz is too low a sample rate for {} baud",
                self.sample_rate, self.baud
            ));
        }
        if self.subsample == 0 || self.subsample as usize >= samples_per_bit {
            return invalid(format!(
                "subsample must be between 1 and {}, got {}",
                samples_per_bit - 1,
                self.subsample
            ));
        }
        let nyquist = self.sample_rate / 2;
        for (name, freq) in [("mark", self.mark_freq), ("space", self.space_freq)] {
            if freq == 0 || freq >= nyquist {
                return invalid(format!(
                    "{name} tone of {freq} Hz is outside (0, {nyquist}) Hz"
                ));
            }
        }
        if self.mark_freq == self.space_freq {
            return invalid("mark and space tones must differ".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemError {
    InvalidConfig(String),
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModemError::InvalidConfig(reason) => write!(f, "Invalid modem configuration: {reason}"),
        }
    }
}

impl error::Error for ModemError {}

/// In-phase and quadrature references of one tone over one bit period.
#[derive(Debug, Clone)]
struct ToneReference {
    i: Vec<f32>,
    q: Vec<f32>,
}

impl ToneReference {
    fn new(freq: u32, sample_rate: u32, len: usize) -> Self {
        let step = 2.0 * PI * freq as f64 / sample_rate as f64;
        let (i, q) = (0..len)
            .map(|n| {
                let angle = step * n as f64;
                (angle.cos() as f32, angle.sin() as f32)
            })
            .unzip();
        Self { i, q }
    }

    /// Squared magnitude of the correlation against `samples`.
    fn power<'a>(&self, samples: impl Iterator<Item = &'a f32> + Clone) -> f32 {
        let mac = |table: &[f32]| -> f32 {
            samples.clone().zip(table).map(|(s, c)| s * c).sum()
        };
        let (i, q) = (mac(&self.i), mac(&self.q));
        i * i + q * q
    }

    /// Signed 16-bit rendition of the quadrature reference, used on transmit.
    fn pcm(&self) -> Vec<i16> {
        self.q.iter().map(|&s| (s * i16::MAX as f32) as i16).collect()
    }
}

/// Bell 202 AFSK modem: quadrature correlation demodulator with a digital
/// PLL for clock recovery, and a table-driven NRZI modulator.
///
/// On transmit every bit is one tone table long. Tables are not joined with
/// phase continuity when the tone toggles, so the output carries small
/// discontinuities at mark/space transitions.
///
/// The bit clock is derived from the table length, so transmitter and
/// receiver always agree on the symbol period. When `sample_rate` is not a
/// multiple of `baud` the effective rate is `sample_rate / samples_per_bit`.
///
/// A single instance must not be used from two threads at once; use one
/// instance per direction if transmit and receive run concurrently.
#[derive(Debug, Clone)]
pub struct Afsk1200 {
    config: Afsk1200Config,
    mark: ToneReference,
    space: ToneReference,
    mark_pcm: Vec<i16>,
    space_pcm: Vec<i16>,
    phase_inc: u32,

    // receive state
    window: Vec<f32>,
    head: usize,
    pending: u32,
    dcd_shreg: u32,
    phase: u32,
    /// Recent tone decisions at bit boundaries, newest in bit 0.
    last_symbols: u8,

    // transmit state
    tx_mark: bool,
}

impl Afsk1200 {
    pub fn new(config: Afsk1200Config) -> Result<Self, ModemError> {
        config.validate()?;

        let len = config.samples_per_bit();
        let mark = ToneReference::new(config.mark_freq, config.sample_rate, len);
        let space = ToneReference::new(config.space_freq, config.sample_rate, len);
        let phase_inc =
            (u64::from(PHASE_WRAP) * u64::from(config.subsample) / len as u64) as u32;

        log::debug!(
            "AFSK modem: {} Hz, {} samples/bit, phase step {:#x}",
            config.sample_rate,
            len,
            phase_inc
        );

        Ok(Self {
            config,
            mark_pcm: mark.pcm(),
            space_pcm: space.pcm(),
            mark,
            space,
            phase_inc,
            window: vec![0.0; len],
            head: 0,
            pending: 0,
            dcd_shreg: 0,
            phase: 0,
            last_symbols: IDLE_SYMBOL,
            tx_mark: true,
        })
    }

    pub fn config(&self) -> &Afsk1200Config {
        &self.config
    }

    pub fn samples_per_bit(&self) -> usize {
        self.window.len()
    }

    /// Returns receive and transmit state to power-on values.
    pub fn reset(&mut self) {
        self.window.fill(0.0);
        self.head = 0;
        self.pending = 0;
        self.dcd_shreg = 0;
        self.phase = 0;
        self.last_symbols = IDLE_SYMBOL;
        self.tx_mark = true;
    }

    /// Mark energy minus space energy over the last bit period.
    fn discriminate(&self) -> f32 {
        // The ring buffer's oldest sample sits at `head`.
        let (newer, older) = self.window.split_at(self.head);
        let samples = older.iter().chain(newer);
        self.mark.power(samples.clone()) - self.space.power(samples)
    }

    /// Advances the bit clock by one correlator step. Returns the recovered
    /// bit when the clock wraps.
    fn clock(&mut self, energy: f32) -> Option<bool> {
        self.dcd_shreg = (self.dcd_shreg << 1) | u32::from(energy > 0.0);

        // An edge between consecutive decisions pulls the clock towards it.
        if (self.dcd_shreg ^ (self.dcd_shreg >> 1)) & 1 != 0 {
            if self.phase < 0x8000 - self.phase_inc / 2 {
                self.phase += self.phase_inc / 8;
            } else {
                self.phase -= self.phase_inc / 8;
            }
        }

        self.phase += self.phase_inc;
        if self.phase < PHASE_WRAP {
            return None;
        }
        self.phase &= PHASE_WRAP - 1;

        self.last_symbols = (self.last_symbols << 1) | (self.dcd_shreg & 1) as u8;
        // NRZI: an unchanged tone is a one.
        Some((self.last_symbols ^ (self.last_symbols >> 1)) & 1 == 0)
    }
}

impl Demodulator for Afsk1200 {
    fn demodulate<S: BitSink>(&mut self, samples: &[f32], sink: &mut S) {
        for &sample in samples {
            self.window[self.head] = sample;
            self.head = (self.head + 1) % self.window.len();

            self.pending += 1;
            if self.pending < self.config.subsample {
                continue;
            }
            self.pending = 0;

            let energy = self.discriminate();
            if let Some(bit) = self.clock(energy) {
                sink.rxbit(bit);
            }
        }
    }
}

impl Modulator for Afsk1200 {
    fn modulate_bits(&mut self, bits: &BitSlice<u8, Lsb0>) -> Vec<i16> {
        let mut samples = Vec::with_capacity(bits.len() * self.samples_per_bit());

        for bit in bits.iter().by_vals() {
            // NRZI: a zero toggles the tone, a one keeps it.
            if !bit {
                self.tx_mark = !self.tx_mark;
            }
            let tone = if self.tx_mark {
                &self.mark_pcm
            } else {
                &self.space_pcm
            };
            samples.extend_from_slice(tone);
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modem() -> Afsk1200 {
        Afsk1200::new(Afsk1200Config::default()).unwrap()
    }

    fn demodulate_all(modem: &mut Afsk1200, samples: &[i16]) -> Vec<bool> {
        let mut bits = Vec::new();
        modem.demodulate_pcm(samples, &mut |bit: bool| bits.push(bit));
        bits
    }

    fn contains(haystack: &[bool], needle: &[bool]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn default_config_tables() {
        let modem = modem();
        assert_eq!(modem.samples_per_bit(), 36);
        assert_eq!(modem.mark_pcm.len(), 36);
        assert_eq!(modem.space_pcm.len(), 36);
        assert_eq!(modem.mark_pcm[0], 0);
        assert_eq!(modem.phase_inc, 0x10000 * 2 / 36);
    }

    #[test]
    fn rejects_invalid_configs() {
        let base = Afsk1200Config::default();
        let cases = [
            Afsk1200Config { baud: 0, ..base },
            Afsk1200Config { sample_rate: 3600, ..base },
            Afsk1200Config { subsample: 0, ..base },
            Afsk1200Config { subsample: 36, ..base },
            Afsk1200Config { space_freq: 30_000, ..base },
            Afsk1200Config { mark_freq: 0, ..base },
            Afsk1200Config { space_freq: 1200, ..base },
        ];

        for config in cases {
            assert!(
                matches!(Afsk1200::new(config), Err(ModemError::InvalidConfig(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn one_bit_per_table() {
        let mut modem = modem();
        let samples = modem.modulate(&[0x12, 0x34, 0x56]);
        assert_eq!(samples.len(), 3 * 8 * 36);
    }

    #[test]
    fn ones_keep_the_tone() {
        let mut modem = modem();
        let samples = modem.modulate(&[0xFF]);
        for chunk in samples.chunks(36) {
            assert_eq!(chunk, modem.mark_pcm.as_slice());
        }
    }

    #[test]
    fn zeros_toggle_the_tone() {
        let mut modem = modem();
        let samples = modem.modulate(&[0x00]);
        let chunks: Vec<&[i16]> = samples.chunks(36).collect();

        assert_eq!(chunks[0], modem.space_pcm.as_slice());
        assert_eq!(chunks[1], modem.mark_pcm.as_slice());
        assert_eq!(chunks[2], modem.space_pcm.as_slice());
        assert_eq!(chunks[7], modem.mark_pcm.as_slice());
    }

    #[test]
    fn tone_state_carries_across_calls() {
        let mut modem = modem();
        let first = modem.modulate_bits(bits![u8, Lsb0; 0]);
        let second = modem.modulate_bits(bits![u8, Lsb0; 1]);
        assert_eq!(first, modem.space_pcm);
        assert_eq!(second, modem.space_pcm);
    }

    #[test]
    fn loopback_recovers_zero_byte() {
        let mut tx = modem();
        let mut rx = modem();

        // Flags around the byte let the receiver's clock settle first.
        let mut bytes = vec![0x7E; 8];
        bytes.push(0x00);
        bytes.extend([0x7E; 2]);

        let bits = demodulate_all(&mut rx, &tx.modulate(&bytes));

        let expected: Vec<bool> = [0x7E_u8, 0x7E, 0x00, 0x7E]
            .view_bits::<Lsb0>()
            .iter()
            .by_vals()
            .collect();
        assert!(contains(&bits, &expected));
    }

    #[test]
    fn bare_zero_byte_loopback() {
        let mut tx = modem();
        let mut rx = modem();

        let bits = demodulate_all(&mut rx, &tx.modulate(&[0x00]));
        assert_eq!(bits, vec![false; 8]);
    }

    #[test]
    fn chunked_calls_match_single_call() {
        let mut tx = modem();
        let samples = tx.modulate(&[0x7E, 0x7E, 0xA5, 0x3C, 0x00, 0xFF, 0x7E]);

        let whole = demodulate_all(&mut modem(), &samples);

        let mut rx = modem();
        let mut chunked = Vec::new();
        for chunk in samples.chunks(37) {
            rx.demodulate_pcm(chunk, &mut |bit: bool| chunked.push(bit));
        }
        // Odd chunk sizes leave a pending sub-sample between calls.
        let mut rx_single_samples = modem();
        let mut one_by_one = Vec::new();
        for sample in &samples {
            rx_single_samples.demodulate_pcm(std::slice::from_ref(sample), &mut |bit: bool| {
                one_by_one.push(bit)
            });
        }

        assert_eq!(whole, chunked);
        assert_eq!(whole, one_by_one);
    }

    #[test]
    fn silence_clocks_out_bits_at_the_baud_rate() {
        let mut rx = modem();
        let bits = demodulate_all(&mut rx, &[0; 3600]);

        assert!((98..=100).contains(&bits.len()), "got {} bits", bits.len());
        // Silence reads as space: one change away from the idle mark, then
        // no tone changes at all.
        assert!(!bits[0]);
        assert!(bits[1..].iter().all(|&bit| bit));
    }

    #[test]
    fn reset_restores_power_on_state() {
        let mut tx = modem();
        let samples = tx.modulate(&[0x7E, 0x00, 0x55]);

        let mut rx = modem();
        let first = demodulate_all(&mut rx, &samples);
        rx.reset();
        let second = demodulate_all(&mut rx, &samples);
        assert_eq!(first, second);

        tx.reset();
        assert_eq!(tx.modulate(&[0x7E, 0x00, 0x55]), samples);
    }
}
