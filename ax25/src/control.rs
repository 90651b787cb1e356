use crate::error::EncodeError;
use std::fmt;

/// ## Supervisory frame kinds
/// Flow-control frames, identified by bits 2-3 of the control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisoryKind {
    RR,  // 00 Receive Ready
    RNR, // 01 Receive Not Ready
    REJ, // 10 Reject
    Unknown(u8),
}

impl SupervisoryKind {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => SupervisoryKind::RR,
            0b01 => SupervisoryKind::RNR,
            0b10 => SupervisoryKind::REJ,
            b => SupervisoryKind::Unknown(b),
        }
    }

    fn bits(&self) -> u8 {
        match self {
            SupervisoryKind::RR => 0b00,
            SupervisoryKind::RNR => 0b01,
            SupervisoryKind::REJ => 0b10,
            SupervisoryKind::Unknown(b) => *b & 0b11,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SupervisoryKind::RR => "Receive Ready",
            SupervisoryKind::RNR => "Receive Not Ready",
            SupervisoryKind::REJ => "Reject",
            SupervisoryKind::Unknown(_) => "Unknown S command",
        }
    }
}

/// ## Unnumbered frame types
/// Identified by a 5-bit code scattered over bits 2-3 and 5-7 of the
/// control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UFrameType {
    UI,   // Unnumbered Information
    DM,   // Disconnected Mode
    SABM, // Set Asynchronous Balanced Mode
    DISC, // Disconnect
    UA,   // Unnumbered Acknowledge
    FRMR, // Frame Reject
    Unknown(u8),
}

impl UFrameType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => UFrameType::UI,
            3 => UFrameType::DM,
            7 => UFrameType::SABM,
            8 => UFrameType::DISC,
            12 => UFrameType::UA,
            17 => UFrameType::FRMR,
            c => UFrameType::Unknown(c),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            UFrameType::UI => 0,
            UFrameType::DM => 3,
            UFrameType::SABM => 7,
            UFrameType::DISC => 8,
            UFrameType::UA => 12,
            UFrameType::FRMR => 17,
            UFrameType::Unknown(c) => *c,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UFrameType::UI => "Unnumbered Information",
            UFrameType::DM => "Disconnected Mode",
            UFrameType::SABM => "Set Asynchronous Balanced Mode",
            UFrameType::DISC => "Disconnect",
            UFrameType::UA => "Unnumbered Acknowledge",
            UFrameType::FRMR => "Frame Reject",
            UFrameType::Unknown(_) => "Unknown U command",
        }
    }
}

/// Control field of a modulo-8 frame. Bit 0 clear is an I frame, `01` an
/// S frame and `11` a U frame; the poll/final bit is always bit 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlField {
    IFrame {
        ns: u8,   // Send Sequence Number
        nr: u8,   // Receive Sequence Number
        pf: bool, // Poll/Final bit
    },
    SFrame {
        kind: SupervisoryKind,
        nr: u8,
        pf: bool,
    },
    UFrame {
        code: UFrameType,
        pf: bool,
    },
}

impl ControlField {
    /// Every byte decodes to some control field.
    pub fn from_u8(byte: u8) -> Self {
        let pf = (byte >> 4) & 1 != 0;
        let nr = (byte >> 5) & 0b111;

        if byte & 0b1 == 0 {
            let ns = (byte >> 1) & 0b111;
            return ControlField::IFrame { ns, nr, pf };
        }
        if byte & 0b11 == 0b01 {
            let kind = SupervisoryKind::from_bits(byte >> 2);
            return ControlField::SFrame { kind, nr, pf };
        }
        let code = ((byte >> 3) & 0b1_1100) | ((byte >> 2) & 0b11);
        ControlField::UFrame {
            code: UFrameType::from_code(code),
            pf,
        }
    }

    /// Packs the field into a byte. Out-of-range values are masked; call
    /// [`ControlField::validate`] first to reject them instead.
    pub fn to_u8(&self) -> u8 {
        match self {
            ControlField::IFrame { ns, nr, pf } => {
                ((nr & 0b111) << 5) | (u8::from(*pf) << 4) | ((ns & 0b111) << 1)
            }
            ControlField::SFrame { kind, nr, pf } => {
                ((nr & 0b111) << 5) | (u8::from(*pf) << 4) | (kind.bits() << 2) | 0b01
            }
            ControlField::UFrame { code, pf } => {
                let code = code.code();
                ((code & 0b1_1100) << 3) | (u8::from(*pf) << 4) | ((code & 0b11) << 2) | 0b11
            }
        }
    }

    /// Checks that the field survives a pack/unpack cycle unchanged.
    pub fn validate(&self) -> Result<(), EncodeError> {
        match self {
            ControlField::IFrame { ns, nr, .. } => {
                check_sequence(*ns)?;
                check_sequence(*nr)
            }
            ControlField::SFrame { kind, nr, .. } => {
                match kind {
                    SupervisoryKind::Unknown(b) if *b != 0b11 => {
                        return Err(EncodeError::InvalidCommand(*b));
                    }
                    _ => {}
                }
                check_sequence(*nr)
            }
            ControlField::UFrame { code, .. } => {
                let raw = code.code();
                if raw > 0b1_1111 || UFrameType::from_code(raw) != *code {
                    return Err(EncodeError::InvalidCommand(raw));
                }
                Ok(())
            }
        }
    }

    pub fn poll_final(&self) -> bool {
        match self {
            ControlField::IFrame { pf, .. }
            | ControlField::SFrame { pf, .. }
            | ControlField::UFrame { pf, .. } => *pf,
        }
    }

    /// I frames and UI frames are followed by a PID byte.
    pub fn has_pid(&self) -> bool {
        matches!(
            self,
            ControlField::IFrame { .. }
                | ControlField::UFrame {
                    code: UFrameType::UI,
                    ..
                }
        )
    }

    pub fn command_name(&self) -> &'static str {
        match self {
            ControlField::IFrame { .. } => "Information",
            ControlField::SFrame { kind, .. } => kind.description(),
            ControlField::UFrame { code, .. } => code.description(),
        }
    }
}

fn check_sequence(n: u8) -> Result<(), EncodeError> {
    if n > 7 {
        return Err(EncodeError::SequenceOutOfRange(n));
    }
    Ok(())
}

/// Short monitor-style tag, e.g. `I03`, `RR5`, `SABM`, `U13`.
impl fmt::Display for ControlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlField::IFrame { ns, nr, .. } => write!(f, "I{nr}{ns}"),
            ControlField::SFrame { kind, nr, .. } => match kind {
                SupervisoryKind::Unknown(b) => write!(f, "S{b}"),
                _ => write!(f, "{kind:?}{nr}"),
            },
            ControlField::UFrame { code, .. } => match code {
                UFrameType::Unknown(c) => write!(f, "U{c}"),
                _ => write!(f, "{code:?}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iframe_from_u8() {
        // I-frame: ns=3, nr=5, pf=true
        // nr(3bits) | pf(1bit) | ns(3bits) | 0
        // 101 | 1 | 011 | 0 = 0b10110110 = 0xB6
        let control = ControlField::from_u8(0b10110110);

        match control {
            ControlField::IFrame { ns, nr, pf } => {
                assert_eq!(ns, 3);
                assert_eq!(nr, 5);
                assert!(pf);
            }
            _ => panic!("Expected IFrame"),
        }
    }

    #[test]
    fn test_iframe_to_u8() {
        let control = ControlField::IFrame {
            ns: 3,
            nr: 5,
            pf: true,
        };
        assert_eq!(control.to_u8(), 0b10110110);
    }

    #[test]
    fn test_sframe_kinds() {
        // nr(3bits) | pf(1bit) | kind(2bits) | 01
        // 100 | 0 | 00 | 01 = 0x81
        let cases = [
            (0b1000_0001, SupervisoryKind::RR),
            (0b1000_0101, SupervisoryKind::RNR),
            (0b1000_1001, SupervisoryKind::REJ),
            (0b1000_1101, SupervisoryKind::Unknown(3)),
        ];

        for (byte, expected) in cases {
            match ControlField::from_u8(byte) {
                ControlField::SFrame { kind, nr, pf } => {
                    assert_eq!(kind, expected);
                    assert_eq!(nr, 4);
                    assert!(!pf);
                }
                other => panic!("Expected SFrame, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_uframe_codes() {
        let cases = [
            (0x03, UFrameType::UI),
            (0x0F, UFrameType::DM),
            (0x2F, UFrameType::SABM),
            (0x43, UFrameType::DISC),
            (0x63, UFrameType::UA),
            (0x87, UFrameType::FRMR),
        ];

        for (byte, expected) in cases {
            let control = ControlField::from_u8(byte);
            assert_eq!(
                control,
                ControlField::UFrame {
                    code: expected,
                    pf: false
                }
            );
            assert_eq!(control.to_u8(), byte);

            // The poll/final bit sits in the middle of the scattered code.
            let polled = ControlField::from_u8(byte | 0x10);
            assert!(polled.poll_final());
            assert_eq!(polled.to_u8(), byte | 0x10);
        }
    }

    #[test]
    fn test_unknown_uframe() {
        // SABME, the modulo-128 mode set, is outside the known set.
        let control = ControlField::from_u8(0x6F);
        assert_eq!(
            control,
            ControlField::UFrame {
                code: UFrameType::Unknown(15),
                pf: false
            }
        );
        assert_eq!(control.to_u8(), 0x6F);
    }

    #[test]
    fn every_byte_survives_a_round_trip() {
        for byte in 0..=u8::MAX {
            let control = ControlField::from_u8(byte);
            assert_eq!(control.to_u8(), byte);
            assert_eq!(control.validate(), Ok(()));
        }
    }

    #[test]
    fn validation_rejects_out_of_range_fields() {
        let bad = [
            ControlField::IFrame {
                ns: 8,
                nr: 0,
                pf: false,
            },
            ControlField::SFrame {
                kind: SupervisoryKind::RR,
                nr: 9,
                pf: false,
            },
        ];
        for control in bad {
            assert!(matches!(
                control.validate(),
                Err(EncodeError::SequenceOutOfRange(_))
            ));
        }

        let aliased = ControlField::UFrame {
            code: UFrameType::Unknown(0),
            pf: false,
        };
        assert_eq!(aliased.validate(), Err(EncodeError::InvalidCommand(0)));

        let wide = ControlField::UFrame {
            code: UFrameType::Unknown(40),
            pf: false,
        };
        assert_eq!(wide.validate(), Err(EncodeError::InvalidCommand(40)));
    }

    #[test]
    fn pid_follows_i_and_ui_only() {
        assert!(ControlField::from_u8(0x00).has_pid());
        assert!(ControlField::from_u8(0x03).has_pid());
        assert!(!ControlField::from_u8(0x01).has_pid());
        assert!(!ControlField::from_u8(0x2F).has_pid());
    }

    #[test]
    fn monitor_tags() {
        assert_eq!(ControlField::from_u8(0b10110110).to_string(), "I53");
        assert_eq!(ControlField::from_u8(0x81).to_string(), "RR4");
        assert_eq!(ControlField::from_u8(0x2F).to_string(), "SABM");
        assert_eq!(ControlField::from_u8(0x6F).to_string(), "U15");
    }
}
