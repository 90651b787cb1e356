use crate::error::{EncodeError, Malformed};
use std::{fmt, str::FromStr};

pub const CALLSIGN_LEN: usize = 6;
pub const BLOCK_LEN: usize = 7;
pub const COMPRESSED_LEN: usize = 7;
pub const MAX_REPEATERS: usize = 8;
/// Destination, source and eight repeaters.
pub const MAX_ADDRESS_LEN: usize = BLOCK_LEN * (2 + MAX_REPEATERS);

const C_BIT: u8 = 0x80;
const EXTENSION_BIT: u8 = 0x01;
const DEFAULT_RESERVED: u8 = 0b11;

/// Station call sign without padding.
///
/// Built from user input it holds 1 to 6 characters of `[A-Z0-9]`. Decoded
/// off the air it may hold any printable ASCII character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Callsign(String);

impl Callsign {
    pub fn new(call: &str) -> Result<Self, EncodeError> {
        let call = call.trim().to_ascii_uppercase();
        if call.is_empty() {
            return Err(EncodeError::EmptyCallsign);
        }
        if call.len() > CALLSIGN_LEN {
            return Err(EncodeError::CallsignTooLong(call));
        }
        if let Some(c) = call.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(EncodeError::InvalidCallsignChar(c));
        }
        Ok(Self(call))
    }

    fn decoded(chars: impl Iterator<Item = u8>) -> Result<Self, Malformed> {
        let mut call = String::with_capacity(CALLSIGN_LEN);
        for c in chars.filter(|&c| c != b' ') {
            if !c.is_ascii_graphic() {
                return Err(Malformed::InvalidCallsign);
            }
            call.push(char::from(c));
        }
        Ok(Self(call))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Call sign characters padded with spaces to six bytes.
    fn padded(&self) -> Result<[u8; CALLSIGN_LEN], EncodeError> {
        if self.0.len() > CALLSIGN_LEN {
            return Err(EncodeError::CallsignTooLong(self.0.clone()));
        }
        let mut chars = [b' '; CALLSIGN_LEN];
        chars[..self.0.len()].copy_from_slice(self.0.as_bytes());
        Ok(chars)
    }
}

impl FromStr for Callsign {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Callsign::new(s)
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One 7-byte address block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub callsign: Callsign,
    pub ssid: u8,
    pub reserved: u8,
    /// Command/response bit on destination and source, has-been-repeated on
    /// a repeater.
    pub c_bit: bool,
}

impl Address {
    pub fn new(callsign: &str, ssid: u8) -> Result<Self, EncodeError> {
        check_ssid(ssid)?;
        Ok(Self {
            callsign: Callsign::new(callsign)?,
            ssid,
            reserved: DEFAULT_RESERVED,
            c_bit: false,
        })
    }

    pub fn repeated(mut self) -> Self {
        self.c_bit = true;
        self
    }

    pub fn has_been_repeated(&self) -> bool {
        self.c_bit
    }

    /// Decodes one block; the flag tells whether it carries the extension bit.
    fn decode(block: &[u8; BLOCK_LEN]) -> Result<(Self, bool), Malformed> {
        let callsign = Callsign::decoded(block[..CALLSIGN_LEN].iter().map(|b| b >> 1))?;
        let trailer = block[CALLSIGN_LEN];
        let address = Self {
            callsign,
            ssid: (trailer >> 1) & 0x0F,
            reserved: (trailer >> 5) & 0b11,
            c_bit: trailer & C_BIT != 0,
        };
        Ok((address, trailer & EXTENSION_BIT != 0))
    }

    fn encode_into(&self, out: &mut Vec<u8>, last: bool) -> Result<(), EncodeError> {
        check_ssid(self.ssid)?;
        if self.reserved > 0b11 {
            return Err(EncodeError::ReservedOutOfRange(self.reserved));
        }
        out.extend(self.callsign.padded()?.iter().map(|c| c << 1));
        out.push(
            (u8::from(self.c_bit) << 7)
                | (self.reserved << 5)
                | (self.ssid << 1)
                | u8::from(last),
        );
        Ok(())
    }
}

/// Parses `CALL`, `CALL-SSID`, optionally followed by `*` to mark the
/// address as repeated.
impl FromStr for Address {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (s, repeated) = match s.strip_suffix('*') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        let address = match s.split_once('-') {
            Some((call, ssid)) => {
                let ssid = ssid
                    .parse::<u8>()
                    .map_err(|_| EncodeError::InvalidAddress(s.to_string()))?;
                Address::new(call, ssid)?
            }
            None => Address::new(s, 0)?,
        };
        Ok(if repeated { address.repeated() } else { address })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ssid == 0 {
            write!(f, "{}", self.callsign)
        } else {
            write!(f, "{}-{}", self.callsign, self.ssid)
        }
    }
}

fn check_ssid(ssid: u8) -> Result<(), EncodeError> {
    if ssid > 0x0F {
        return Err(EncodeError::SsidOutOfRange(ssid));
    }
    Ok(())
}

/// Digipeaters the frame travels through, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeaterPath(Vec<Address>);

impl RepeaterPath {
    pub fn new(repeaters: Vec<Address>) -> Result<Self, EncodeError> {
        if repeaters.len() > MAX_REPEATERS {
            return Err(EncodeError::TooManyRepeaters(repeaters.len()));
        }
        Ok(Self(repeaters))
    }

    pub fn push(&mut self, repeater: Address) -> Result<(), EncodeError> {
        if self.0.len() == MAX_REPEATERS {
            return Err(EncodeError::TooManyRepeaters(MAX_REPEATERS + 1));
        }
        self.0.push(repeater);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Address> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a RepeaterPath {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Single-block header that carries only the destination.
///
/// ```text
/// ??????QQ QQQQQQCT 11111122 22223333 33444444 55555566 6666SSSS
/// ```
/// `?` is the HID, `Q` the QSO number, `C` the command bit, `T` the header
/// type (always 1), `1`-`6` six-bit characters offset from 0x20 and `S` the
/// SSID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedAddress {
    pub destination: Callsign,
    pub ssid: u8,
    pub qso: u8,
    pub hid: u8,
    pub command: bool,
}

impl CompressedAddress {
    fn decode(b: &[u8; COMPRESSED_LEN]) -> Self {
        let sixbit = [
            b[2] >> 2,
            ((b[2] & 0x03) << 4) | (b[3] >> 4),
            ((b[3] & 0x0F) << 2) | (b[4] >> 6),
            b[4] & 0x3F,
            b[5] >> 2,
            ((b[5] & 0x03) << 4) | (b[6] >> 4),
        ];
        // Six-bit characters are always printable.
        let chars: String = sixbit.iter().map(|&c| char::from(c + 0x20)).collect();
        let destination = Callsign(chars.trim_end().to_string());

        Self {
            destination,
            ssid: b[6] & 0x0F,
            qso: ((b[0] & 0x03) << 6) | (b[1] >> 2),
            hid: b[0] >> 2,
            command: b[1] & 0b10 != 0,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        check_ssid(self.ssid)?;
        if self.hid > 0x3F {
            return Err(EncodeError::HidOutOfRange(self.hid));
        }
        let chars = self.destination.padded()?;
        let mut s = [0u8; CALLSIGN_LEN];
        for (six, &c) in s.iter_mut().zip(&chars) {
            if !(0x20..=0x5F).contains(&c) {
                return Err(EncodeError::InvalidCallsignChar(char::from(c)));
            }
            *six = c - 0x20;
        }

        out.extend_from_slice(&[
            (self.hid << 2) | (self.qso >> 6),
            ((self.qso & 0x3F) << 2) | (u8::from(self.command) << 1) | 1,
            (s[0] << 2) | (s[1] >> 4),
            ((s[1] & 0x0F) << 4) | (s[2] >> 2),
            ((s[2] & 0x03) << 6) | s[3],
            (s[4] << 2) | (s[5] >> 4),
            ((s[5] & 0x0F) << 4) | self.ssid,
        ]);
        Ok(())
    }
}

/// How the C bits of a normal header are to be read.
///
/// Version 2 stations set exactly one of the destination and source C bits.
/// Version 1 stations set both for a command and neither for a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResponse {
    Command,
    Response,
    CommandV1,
    ResponseV1,
}

impl CommandResponse {
    pub fn is_command(&self) -> bool {
        matches!(self, CommandResponse::Command | CommandResponse::CommandV1)
    }

    pub fn is_response(&self) -> bool {
        !self.is_command()
    }

    /// Destination and source C bits.
    fn c_bits(&self) -> (bool, bool) {
        match self {
            CommandResponse::Command => (true, false),
            CommandResponse::Response => (false, true),
            CommandResponse::CommandV1 => (true, true),
            CommandResponse::ResponseV1 => (false, false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressField {
    Normal {
        destination: Address,
        source: Address,
        repeaters: RepeaterPath,
    },
    Compressed(CompressedAddress),
}

impl AddressField {
    pub fn new(destination: Address, source: Address) -> Self {
        AddressField::Normal {
            destination,
            source,
            repeaters: RepeaterPath::default(),
        }
    }

    /// Decodes the address field at the start of `frame`, returning it with
    /// the number of bytes consumed. The last two bytes of `frame` are the
    /// FCS and never part of the address.
    pub(crate) fn decode(frame: &[u8]) -> Result<(Self, usize), Malformed> {
        if frame.len() < 2 {
            return Err(Malformed::TooShort(frame.len()));
        }
        if frame[1] & EXTENSION_BIT != 0 {
            let block = frame
                .first_chunk::<COMPRESSED_LEN>()
                .ok_or(Malformed::TooShort(frame.len()))?;
            return Ok((
                AddressField::Compressed(CompressedAddress::decode(block)),
                COMPRESSED_LEN,
            ));
        }

        let body = &frame[..frame.len().saturating_sub(2)];
        let len = body
            .iter()
            .take(MAX_ADDRESS_LEN)
            .position(|b| b & EXTENSION_BIT != 0)
            .map(|i| i + 1)
            .ok_or(Malformed::UnterminatedAddress)?;
        if len < 2 * BLOCK_LEN || len % BLOCK_LEN != 0 {
            return Err(Malformed::AddressLength(len));
        }

        let mut blocks = body[..len]
            .chunks_exact(BLOCK_LEN)
            .filter_map(|chunk| <&[u8; BLOCK_LEN]>::try_from(chunk).ok())
            .map(Address::decode);

        let (destination, _) = blocks.next().ok_or(Malformed::AddressLength(len))??;
        let (source, _) = blocks.next().ok_or(Malformed::AddressLength(len))??;
        let mut repeaters = Vec::with_capacity(len / BLOCK_LEN - 2);
        for block in blocks {
            let (repeater, _) = block?;
            repeaters.push(repeater);
        }

        Ok((
            AddressField::Normal {
                destination,
                source,
                repeaters: RepeaterPath(repeaters),
            },
            len,
        ))
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            AddressField::Normal {
                destination,
                source,
                repeaters,
            } => {
                if repeaters.len() > MAX_REPEATERS {
                    return Err(EncodeError::TooManyRepeaters(repeaters.len()));
                }
                destination.encode_into(out, false)?;
                source.encode_into(out, repeaters.is_empty())?;
                for (i, repeater) in repeaters.iter().enumerate() {
                    repeater.encode_into(out, i + 1 == repeaters.len())?;
                }
                Ok(())
            }
            AddressField::Compressed(compressed) => compressed.encode_into(out),
        }
    }

    pub fn destination(&self) -> &Callsign {
        match self {
            AddressField::Normal { destination, .. } => &destination.callsign,
            AddressField::Compressed(compressed) => &compressed.destination,
        }
    }

    pub fn source(&self) -> Option<&Address> {
        match self {
            AddressField::Normal { source, .. } => Some(source),
            AddressField::Compressed(_) => None,
        }
    }

    pub fn repeaters(&self) -> &[Address] {
        match self {
            AddressField::Normal { repeaters, .. } => repeaters.as_slice(),
            AddressField::Compressed(_) => &[],
        }
    }

    pub fn command_response(&self) -> CommandResponse {
        match self {
            AddressField::Normal {
                destination,
                source,
                ..
            } => match (destination.c_bit, source.c_bit) {
                (true, false) => CommandResponse::Command,
                (false, true) => CommandResponse::Response,
                (true, true) => CommandResponse::CommandV1,
                (false, false) => CommandResponse::ResponseV1,
            },
            AddressField::Compressed(compressed) if compressed.command => {
                CommandResponse::Command
            }
            AddressField::Compressed(_) => CommandResponse::Response,
        }
    }

    /// Sets the destination and source C bits for the given direction.
    /// Compressed headers only distinguish command from response.
    pub fn set_command_response(&mut self, cr: CommandResponse) {
        match self {
            AddressField::Normal {
                destination,
                source,
                ..
            } => {
                let (dest_c, src_c) = cr.c_bits();
                destination.c_bit = dest_c;
                source.c_bit = src_c;
            }
            AddressField::Compressed(compressed) => {
                compressed.command = cr.is_command();
            }
        }
    }
}

/// Monitor form: `SRC>DEST,RPT1*,RPT2`. A compressed header has no source.
impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressField::Normal {
                destination,
                source,
                repeaters,
            } => {
                write!(f, "{source}>{destination}")?;
                for repeater in repeaters {
                    write!(f, ",{repeater}")?;
                    if repeater.has_been_repeated() {
                        f.write_str("*")?;
                    }
                }
                Ok(())
            }
            AddressField::Compressed(compressed) => {
                write!(f, ">{}", compressed.destination)?;
                if compressed.ssid != 0 {
                    write!(f, "-{}", compressed.ssid)?;
                }
                Ok(())
            }
        }
    }
}
