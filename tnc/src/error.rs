use ax25::EncodeError;
use modem::ModemError;
use std::{error, fmt, io};

#[derive(Debug)]
pub enum TncError {
    Config(config::ConfigError),
    Modem(ModemError),
    Encode(EncodeError),
    Io(io::Error),
}

impl fmt::Display for TncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TncError::Config(e) => write!(f, "Error loading configuration: {e}"),
            TncError::Modem(e) => write!(f, "{e}"),
            TncError::Encode(e) => write!(f, "Error encoding frame: {e}"),
            TncError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl error::Error for TncError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            TncError::Config(e) => Some(e),
            TncError::Modem(e) => Some(e),
            TncError::Encode(e) => Some(e),
            TncError::Io(e) => Some(e),
        }
    }
}

impl From<config::ConfigError> for TncError {
    fn from(e: config::ConfigError) -> Self {
        TncError::Config(e)
    }
}

impl From<ModemError> for TncError {
    fn from(e: ModemError) -> Self {
        TncError::Modem(e)
    }
}

impl From<EncodeError> for TncError {
    fn from(e: EncodeError) -> Self {
        TncError::Encode(e)
    }
}

impl From<io::Error> for TncError {
    fn from(e: io::Error) -> Self {
        TncError::Io(e)
    }
}
