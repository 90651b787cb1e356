use crate::address::{Address, AddressField, CommandResponse, RepeaterPath};
use crate::control::{ControlField, UFrameType};
use crate::error::{DecodeError, EncodeError, Malformed};
use crate::fcs;
use crate::pid::Pid;
use std::fmt;

/// Smallest buffer that can hold a frame: compressed address, control and
/// FCS.
pub const MIN_FRAME_LEN: usize = 10;
pub const MAX_FRAME_LEN: usize = 512;
pub const MAX_INFO_LEN: usize = 256;
pub const FRMR_INFO_LEN: usize = 3;
const FCS_LEN: usize = 2;

/// A link-layer frame.
///
/// Equality compares the parsed fields only, so a decoded frame equals the
/// frame it was encoded from.
#[derive(Debug, Clone)]
pub struct Frame {
    pub address: AddressField,
    pub control: ControlField,
    /// Present exactly when [`ControlField::has_pid`] holds.
    pub pid: Option<Pid>,
    pub info: Vec<u8>,
    /// The buffer the frame was decoded from, FCS included. `None` for
    /// frames built locally; [`Frame::encode`] always computes a fresh FCS.
    pub raw: Option<Vec<u8>>,
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
            && self.control == other.control
            && self.pid == other.pid
            && self.info == other.info
    }
}

impl Eq for Frame {}

impl Frame {
    /// A UI command frame without layer 3 protocol, the kind used for
    /// beacons and APRS.
    pub fn ui(destination: Address, source: Address, info: impl Into<Vec<u8>>) -> Self {
        let mut address = AddressField::new(destination, source);
        address.set_command_response(CommandResponse::Command);
        Self {
            address,
            control: ControlField::UFrame {
                code: UFrameType::UI,
                pf: false,
            },
            pid: Some(Pid::NoLayer3),
            info: info.into(),
            raw: None,
        }
    }

    /// Replaces the repeater path. Compressed headers have none and are
    /// left untouched.
    pub fn via(mut self, path: RepeaterPath) -> Self {
        if let AddressField::Normal { repeaters, .. } = &mut self.address {
            *repeaters = path;
        }
        self
    }

    /// Decodes the structure of `buffer` without looking at its FCS.
    pub fn parse(buffer: &[u8]) -> Result<Self, Malformed> {
        check_len(buffer)?;
        let body = &buffer[..buffer.len() - FCS_LEN];

        let (address, mut pos) = AddressField::decode(buffer)?;
        let &control = body.get(pos).ok_or(Malformed::TooShort(buffer.len()))?;
        let control = ControlField::from_u8(control);
        pos += 1;

        let pid = if control.has_pid() {
            let &pid = body.get(pos).ok_or(Malformed::MissingPid)?;
            pos += 1;
            Some(Pid::from_u8(pid))
        } else {
            None
        };

        let info = &body[pos..];
        match control {
            ControlField::UFrame {
                code: UFrameType::FRMR,
                ..
            } if info.len() != FRMR_INFO_LEN => {
                return Err(Malformed::FrmrInfoLength(info.len()));
            }
            ControlField::UFrame {
                code: UFrameType::FRMR,
                ..
            } => {}
            _ if carries_info(&control) => {
                if info.len() > MAX_INFO_LEN {
                    return Err(Malformed::InfoTooLong(info.len()));
                }
            }
            _ if !info.is_empty() => return Err(Malformed::UnexpectedInfo(info.len())),
            _ => {}
        }

        Ok(Self {
            address,
            control,
            pid,
            info: info.to_vec(),
            raw: Some(buffer.to_vec()),
        })
    }

    /// Checks the FCS of `buffer`, then decodes its structure.
    pub fn decode(buffer: &[u8]) -> Result<Self, DecodeError> {
        check_len(buffer)?;
        fcs::verify(buffer)?;
        Ok(Self::parse(buffer)?)
    }

    /// Serialises the frame with its FCS appended, rejecting any field that
    /// would not decode back to the same value.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.control.validate()?;
        match (self.control.has_pid(), &self.pid) {
            (true, None) => return Err(EncodeError::MissingPid),
            (false, Some(_)) => return Err(EncodeError::UnexpectedPid),
            (_, Some(pid)) => pid.validate()?,
            (false, None) => {}
        }

        let info_len = self.info.len();
        if matches!(
            self.control,
            ControlField::UFrame {
                code: UFrameType::FRMR,
                ..
            }
        ) {
            if info_len != FRMR_INFO_LEN {
                return Err(EncodeError::FrmrInfoLength(info_len));
            }
        } else if carries_info(&self.control) {
            if info_len > MAX_INFO_LEN {
                return Err(EncodeError::InfoTooLong(info_len));
            }
        } else if info_len != 0 {
            return Err(EncodeError::UnexpectedInfo(info_len));
        }

        let mut out = Vec::with_capacity(self.address_len() + 2 + info_len + FCS_LEN);
        self.address.encode_into(&mut out)?;
        out.push(self.control.to_u8());
        if let Some(pid) = &self.pid {
            out.push(pid.to_u8());
        }
        out.extend_from_slice(&self.info);
        fcs::append(&mut out);
        Ok(out)
    }

    fn address_len(&self) -> usize {
        match &self.address {
            AddressField::Normal { repeaters, .. } => 7 * (2 + repeaters.len()),
            AddressField::Compressed(_) => 7,
        }
    }

    pub fn source(&self) -> Option<&Address> {
        self.address.source()
    }

    /// FCS as received, read big-endian. `None` for frames built locally.
    pub fn fcs(&self) -> Option<u16> {
        self.raw.as_deref().and_then(fcs::received)
    }

    pub fn command_response(&self) -> CommandResponse {
        self.address.command_response()
    }
}

/// Information, UI and unknown U frames carry free-form info; FRMR carries
/// its fixed diagnostic bytes; everything else carries none.
fn carries_info(control: &ControlField) -> bool {
    matches!(
        control,
        ControlField::IFrame { .. }
            | ControlField::UFrame {
                code: UFrameType::UI | UFrameType::Unknown(_),
                ..
            }
    )
}

fn check_len(buffer: &[u8]) -> Result<(), Malformed> {
    if buffer.len() < MIN_FRAME_LEN {
        return Err(Malformed::TooShort(buffer.len()));
    }
    if buffer.len() > MAX_FRAME_LEN {
        return Err(Malformed::TooLong(buffer.len()));
    }
    Ok(())
}

/// TNC2 monitor line: `SRC>DEST,RPT*:info`. Frames other than UI carry
/// their control tag, e.g. `SRC>DEST <SABM>`. Bytes outside printable ASCII
/// are shown as `<0xNN>`.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;

        let is_ui = matches!(
            self.control,
            ControlField::UFrame {
                code: UFrameType::UI,
                ..
            }
        );
        if !is_ui {
            write!(f, " <{}>", self.control)?;
        }
        if !is_ui && self.info.is_empty() {
            return Ok(());
        }

        f.write_str(":")?;
        for &b in &self.info {
            if b == b' ' || b.is_ascii_graphic() {
                write!(f, "{}", char::from(b))?;
            } else {
                write!(f, "<{b:#04x}>")?;
            }
        }
        Ok(())
    }
}
