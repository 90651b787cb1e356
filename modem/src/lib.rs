pub mod afsk1200;
pub mod demodulator;
pub mod modulator;

pub use afsk1200::{Afsk1200, Afsk1200Config, ModemError};
pub use demodulator::{BitSink, Demodulator};
pub use modulator::Modulator;
