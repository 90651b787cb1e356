use std::{error, fmt};

/// Structural reasons a received buffer cannot be turned into a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    TooShort(usize),
    TooLong(usize),
    /// No address byte carried the extension bit.
    UnterminatedAddress,
    AddressLength(usize),
    /// A call-sign byte decoded to a non-printable character.
    InvalidCallsign,
    MissingPid,
    InfoTooLong(usize),
    /// Bytes after the control field of a frame type that carries no info.
    UnexpectedInfo(usize),
    FrmrInfoLength(usize),
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::TooShort(len) => write!(f, "frame of {len} bytes is too short"),
            Malformed::TooLong(len) => write!(f, "frame of {len} bytes is too long"),
            Malformed::UnterminatedAddress => write!(f, "address field is not terminated"),
            Malformed::AddressLength(len) => write!(f, "invalid address field length {len}"),
            Malformed::InvalidCallsign => write!(f, "call sign contains non-printable characters"),
            Malformed::MissingPid => write!(f, "PID byte missing"),
            Malformed::InfoTooLong(len) => write!(f, "info field of {len} bytes is too long"),
            Malformed::UnexpectedInfo(len) => {
                write!(f, "{len} unexpected bytes after the control field")
            }
            Malformed::FrmrInfoLength(len) => {
                write!(f, "FRMR info field must be 3 bytes, got {len}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Malformed(Malformed),
    ChecksumMismatch { received: u16, computed: u16 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Malformed(reason) => write!(f, "Malformed frame: {reason}"),
            DecodeError::ChecksumMismatch { received, computed } => write!(
                f,
                "FCS mismatch: received {received:#06x}, computed {computed:#06x}"
            ),
        }
    }
}

impl error::Error for DecodeError {}

impl From<Malformed> for DecodeError {
    fn from(reason: Malformed) -> Self {
        DecodeError::Malformed(reason)
    }
}

/// Range and charset violations found while building or encoding a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    EmptyCallsign,
    CallsignTooLong(String),
    InvalidCallsignChar(char),
    SsidOutOfRange(u8),
    ReservedOutOfRange(u8),
    HidOutOfRange(u8),
    TooManyRepeaters(usize),
    SequenceOutOfRange(u8),
    /// The command code decodes to a different command, or is out of range.
    InvalidCommand(u8),
    /// The PID value decodes to a different PID.
    InvalidPid(u8),
    MissingPid,
    UnexpectedPid,
    InfoTooLong(usize),
    UnexpectedInfo(usize),
    FrmrInfoLength(usize),
    InvalidAddress(String),
    /// The encoded frame does not fit the receive buffer of the link.
    FrameTooLong { len: usize, max: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::EmptyCallsign => write!(f, "Call sign is empty"),
            EncodeError::CallsignTooLong(call) => {
                write!(f, "Call sign {call:?} is longer than 6 characters")
            }
            EncodeError::InvalidCallsignChar(c) => write!(f, "Invalid call sign character {c:?}"),
            EncodeError::SsidOutOfRange(ssid) => write!(f, "SSID {ssid} is out of range 0-15"),
            EncodeError::ReservedOutOfRange(bits) => {
                write!(f, "Reserved bits {bits} are out of range 0-3")
            }
            EncodeError::HidOutOfRange(hid) => write!(f, "HID {hid} is out of range 0-63"),
            EncodeError::TooManyRepeaters(n) => write!(f, "{n} repeaters, at most 8 allowed"),
            EncodeError::SequenceOutOfRange(n) => {
                write!(f, "Sequence number {n} is out of range 0-7")
            }
            EncodeError::InvalidCommand(code) => write!(f, "Invalid command code {code:#04x}"),
            EncodeError::InvalidPid(pid) => write!(f, "Invalid PID {pid:#04x}"),
            EncodeError::MissingPid => write!(f, "Frame type requires a PID"),
            EncodeError::UnexpectedPid => write!(f, "Frame type carries no PID"),
            EncodeError::InfoTooLong(len) => write!(f, "Info field of {len} bytes is too long"),
            EncodeError::UnexpectedInfo(len) => {
                write!(f, "Frame type carries no info, got {len} bytes")
            }
            EncodeError::FrmrInfoLength(len) => {
                write!(f, "FRMR info field must be 3 bytes, got {len}")
            }
            EncodeError::InvalidAddress(text) => write!(f, "Invalid address {text:?}"),
            EncodeError::FrameTooLong { len, max } => {
                write!(f, "Encoded frame of {len} bytes exceeds the {max}-byte frame buffer")
            }
        }
    }
}

impl error::Error for EncodeError {}
