use crate::framer::FLAG;

/// Frame buffer size used by [`Deframer::new`].
pub const DEFAULT_CAPACITY: usize = 256;

// Anything shorter between two flags is idle fill or noise.
const MIN_FRAME_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for a flag; incoming bits are discarded.
    Hunting,
    /// A flag has been seen; bits are assembled into the frame buffer.
    Synced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeframeEvent {
    /// Bytes found between two flags, FCS included.
    Frame(Vec<u8>),
    /// Seven consecutive ones arrived in the middle of a frame.
    Abort,
    /// The frame grew past the buffer capacity.
    Overflow,
}

/// Receive-side HDLC state machine, fed one bit at a time.
///
/// Bits arrive least significant first. The deframer removes stuffed zeros
/// and hands back the raw bytes between flags; it does not check the FCS.
#[derive(Debug, Clone)]
pub struct Deframer {
    state: ParserState,
    window: u8,
    byte: u8,
    bit_count: u8,
    buffer: Vec<u8>,
    capacity: usize,
}

impl Default for Deframer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deframer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: ParserState::Hunting,
            window: 0,
            byte: 0,
            bit_count: 0,
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn rxbit(&mut self, bit: bool) -> Option<DeframeEvent> {
        self.window = (self.window << 1) | u8::from(bit);

        if self.window == FLAG {
            let frame = (self.state == ParserState::Synced && self.buffer.len() >= MIN_FRAME_LEN)
                .then(|| std::mem::take(&mut self.buffer));
            self.buffer.clear();
            self.byte = 0;
            self.bit_count = 0;
            self.state = ParserState::Synced;

            return frame.map(|bytes| {
                log::trace!("HDLC frame of {} bytes", bytes.len());
                DeframeEvent::Frame(bytes)
            });
        }

        if self.window & 0x7F == 0x7F {
            let aborted = self.state == ParserState::Synced && !self.buffer.is_empty();
            self.hunt();
            if aborted {
                log::trace!("HDLC abort");
                return Some(DeframeEvent::Abort);
            }
            return None;
        }

        if self.state == ParserState::Hunting {
            return None;
        }

        // Five ones then a zero: the zero was stuffed by the sender.
        if self.window & 0x3F == 0x3E {
            return None;
        }

        self.byte = (self.byte >> 1) | (u8::from(bit) << 7);
        self.bit_count += 1;
        if self.bit_count < 8 {
            return None;
        }
        self.bit_count = 0;

        if self.buffer.len() >= self.capacity {
            log::debug!("HDLC frame exceeds {} bytes, dropped", self.capacity);
            self.hunt();
            return Some(DeframeEvent::Overflow);
        }
        self.buffer.push(self.byte);
        None
    }

    fn hunt(&mut self) {
        self.state = ParserState::Hunting;
        self.buffer.clear();
        self.byte = 0;
        self.bit_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::Framer;
    use bitvec::prelude::*;

    fn feed<'a>(
        deframer: &mut Deframer,
        bits: impl IntoIterator<Item = &'a bool>,
    ) -> Vec<DeframeEvent> {
        bits.into_iter()
            .filter_map(|&bit| deframer.rxbit(bit))
            .collect()
    }

    fn on_air(bytes: &[u8]) -> Vec<bool> {
        Framer::with_flags(1, 1).frame(bytes).iter().by_vals().collect()
    }

    const GARBAGE: [bool; 4] = [false, true, true, false];

    #[test]
    fn frame_with_no_garbage() {
        let mut deframer = Deframer::new();
        let events = feed(&mut deframer, &on_air(&[0x11, 0x22, 0x33]));
        assert_eq!(events, vec![DeframeEvent::Frame(vec![0x11, 0x22, 0x33])]);
    }

    #[test]
    fn frame_with_garbage_before_and_after() {
        let mut deframer = Deframer::new();
        let mut bits = GARBAGE.to_vec();
        bits.extend(on_air(&[0xA1, 0xB2, 0xC3, 0xD4]));
        bits.extend(GARBAGE);

        let events = feed(&mut deframer, &bits);
        assert_eq!(events, vec![DeframeEvent::Frame(vec![0xA1, 0xB2, 0xC3, 0xD4])]);
    }

    #[test]
    fn starts_hunting_and_syncs_on_flag() {
        let mut deframer = Deframer::new();
        assert_eq!(deframer.state(), ParserState::Hunting);

        feed(&mut deframer, FLAG.view_bits::<Lsb0>().iter().by_refs());
        assert_eq!(deframer.state(), ParserState::Synced);
    }

    #[test]
    fn short_buffers_are_ignored() {
        let mut deframer = Deframer::new();
        assert!(feed(&mut deframer, &on_air(&[])).is_empty());
        assert!(feed(&mut deframer, &on_air(&[0x01, 0x02])).is_empty());
    }

    #[test]
    fn back_to_back_frames_share_a_flag() {
        let mut bits: Vec<bool> = FLAG.view_bits::<Lsb0>().iter().by_vals().collect();
        for bytes in [[0x10_u8, 0x20, 0x30], [0x40, 0x50, 0x60]] {
            bits.extend(crate::bit_stuff(bytes.view_bits::<Lsb0>()).iter().by_vals());
            bits.extend(FLAG.view_bits::<Lsb0>().iter().by_vals());
        }

        let mut deframer = Deframer::new();
        let events = feed(&mut deframer, &bits);
        assert_eq!(
            events,
            vec![
                DeframeEvent::Frame(vec![0x10, 0x20, 0x30]),
                DeframeEvent::Frame(vec![0x40, 0x50, 0x60]),
            ]
        );
    }

    #[test]
    fn stuffed_bits_are_removed() {
        let bytes = vec![0xFF, 0xFF, 0x7E, 0x3E, 0xF8];
        let mut deframer = Deframer::new();
        let events = feed(&mut deframer, &on_air(&bytes));
        assert_eq!(events, vec![DeframeEvent::Frame(bytes)]);
    }

    #[test]
    fn seven_ones_abort_then_recover() {
        let mut bits: Vec<bool> = FLAG.view_bits::<Lsb0>().iter().by_vals().collect();
        bits.extend([0x11_u8, 0x22].view_bits::<Lsb0>().iter().by_vals());
        bits.extend([true; 8]);

        let mut deframer = Deframer::new();
        assert_eq!(feed(&mut deframer, &bits), vec![DeframeEvent::Abort]);
        assert_eq!(deframer.state(), ParserState::Hunting);

        let events = feed(&mut deframer, &on_air(&[0x01, 0x02, 0x03]));
        assert_eq!(events, vec![DeframeEvent::Frame(vec![0x01, 0x02, 0x03])]);
    }

    #[test]
    fn ones_while_hunting_are_not_an_abort() {
        let mut deframer = Deframer::new();
        assert!(feed(&mut deframer, &[true; 20]).is_empty());
    }

    #[test]
    fn overflow_drops_the_frame() {
        let mut deframer = Deframer::with_capacity(4);
        let events = feed(&mut deframer, &on_air(&[1, 2, 3, 4, 5]));
        assert_eq!(events, vec![DeframeEvent::Overflow]);

        let events = feed(&mut deframer, &on_air(&[6, 7, 8]));
        assert_eq!(events, vec![DeframeEvent::Frame(vec![6, 7, 8])]);
    }

    #[test]
    fn frame_at_exact_capacity_is_delivered() {
        let mut deframer = Deframer::with_capacity(4);
        let events = feed(&mut deframer, &on_air(&[1, 2, 3, 4]));
        assert_eq!(events, vec![DeframeEvent::Frame(vec![1, 2, 3, 4])]);
    }
}
