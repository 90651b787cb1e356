/// Receives the bits recovered by a [`Demodulator`], one at a time, on the
/// caller's thread.
pub trait BitSink {
    fn rxbit(&mut self, bit: bool);
}

impl<F> BitSink for F
where
    F: FnMut(bool),
{
    fn rxbit(&mut self, bit: bool) {
        self(bit)
    }
}

/// Turns audio samples into a raw bit stream.
///
/// Implementations are streaming: calling `demodulate` repeatedly with
/// consecutive chunks behaves like a single call over the concatenated
/// samples.
pub trait Demodulator {
    /// Demodulates normalized mono samples in `[-1, 1]`, pushing every
    /// recovered bit into `sink`.
    fn demodulate<S: BitSink>(&mut self, samples: &[f32], sink: &mut S);

    /// Same as [`Demodulator::demodulate`], for signed 16-bit PCM.
    fn demodulate_pcm<S: BitSink>(&mut self, samples: &[i16], sink: &mut S) {
        let normalized: Vec<f32> = samples
            .iter()
            .map(|&s| s as f32 / i16::MAX as f32)
            .collect();
        self.demodulate(&normalized, sink);
    }
}
