use modem::Afsk1200Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub modem: Afsk1200Config,
    pub link: LinkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Flags sent before each frame while the transmitter keys up.
    pub tx_delay_flags: usize,
    /// Flags sent after each frame.
    pub tx_tail_flags: usize,
    /// Receive buffer size; longer frames are dropped.
    pub max_frame_len: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            tx_delay_flags: 30,
            tx_tail_flags: 10,
            max_frame_len: hdlc::DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, overridden by
    /// `TNC_`-prefixed environment variables such as
    /// `TNC_MODEM__SAMPLE_RATE=48000`.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("TNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
