use crate::error::EncodeError;

/// Protocol identifier carried by I and UI frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pid {
    X25Plp,
    CompressedTcpIp,
    UncompressedTcpIp,
    SegmentationFragment,
    Texnet,
    LinkQuality,
    AppleTalk,
    AppleTalkArp,
    ArpaIp,
    ArpaAddressResolution,
    FlexNet,
    NetRom,
    NoLayer3,
    Escape,
    /// `yy01yyyy` or `yy10yyyy`: an AX.25 layer 3 protocol.
    Ax25Layer3(u8),
    Unknown(u8),
}

impl Pid {
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            0x01 => Pid::X25Plp,
            0x06 => Pid::CompressedTcpIp,
            0x07 => Pid::UncompressedTcpIp,
            0x08 => Pid::SegmentationFragment,
            0xC3 => Pid::Texnet,
            0xC4 => Pid::LinkQuality,
            0xCA => Pid::AppleTalk,
            0xCB => Pid::AppleTalkArp,
            0xCC => Pid::ArpaIp,
            0xCD => Pid::ArpaAddressResolution,
            0xCE => Pid::FlexNet,
            0xCF => Pid::NetRom,
            0xF0 => Pid::NoLayer3,
            0xFF => Pid::Escape,
            b if matches!(b & 0x30, 0x10 | 0x20) => Pid::Ax25Layer3(b),
            b => Pid::Unknown(b),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            Pid::X25Plp => 0x01,
            Pid::CompressedTcpIp => 0x06,
            Pid::UncompressedTcpIp => 0x07,
            Pid::SegmentationFragment => 0x08,
            Pid::Texnet => 0xC3,
            Pid::LinkQuality => 0xC4,
            Pid::AppleTalk => 0xCA,
            Pid::AppleTalkArp => 0xCB,
            Pid::ArpaIp => 0xCC,
            Pid::ArpaAddressResolution => 0xCD,
            Pid::FlexNet => 0xCE,
            Pid::NetRom => 0xCF,
            Pid::NoLayer3 => 0xF0,
            Pid::Escape => 0xFF,
            Pid::Ax25Layer3(b) | Pid::Unknown(b) => *b,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), EncodeError> {
        let byte = self.to_u8();
        if Pid::from_u8(byte) != *self {
            return Err(EncodeError::InvalidPid(byte));
        }
        Ok(())
    }

    pub fn description(&self) -> &'static str {
        match self {
            Pid::X25Plp => "ISO 8208/CCITT X.25 PLP",
            Pid::CompressedTcpIp => "Compressed TCP/IP packet (RFC 1144)",
            Pid::UncompressedTcpIp => "Uncompressed TCP/IP packet (RFC 1144)",
            Pid::SegmentationFragment => "Segmentation fragment",
            Pid::Texnet => "TEXNET datagram protocol",
            Pid::LinkQuality => "Link Quality Protocol",
            Pid::AppleTalk => "AppleTalk",
            Pid::AppleTalkArp => "AppleTalk ARP",
            Pid::ArpaIp => "ARPA Internet Protocol",
            Pid::ArpaAddressResolution => "ARPA Address Resolution",
            Pid::FlexNet => "FlexNet",
            Pid::NetRom => "NET/ROM",
            Pid::NoLayer3 => "No layer 3 protocol",
            Pid::Escape => "Escape, next octet holds more layer 3 information",
            Pid::Ax25Layer3(_) => "AX.25 layer 3 implemented",
            Pid::Unknown(_) => "Reserved for future layer 3 protocols",
        }
    }
}
