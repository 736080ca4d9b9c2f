/// Commands understood by the MH-Z19B sensor.
///
/// The undocumented commands behave on the wire exactly like the documented ones. They are
/// kept apart only because the datasheet does not describe them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Enable or disable automatic baseline correction.
    SetAutoCalibration,
    /// Read CO2 concentration.
    ReadCo2,
    /// Zero point calibration at 400 ppm.
    CalibrateZeroPoint,
    /// Span point calibration.
    CalibrateSpanPoint,
    /// Set detection range.
    SetRange,
    /// Read automatic baseline correction status (not documented).
    GetAutoCalibration,
    /// Read detection range (not documented).
    GetRange,
    /// Read firmware version (not documented).
    GetVersion,
}

impl Command {
    /// Op code used for the command in communication with the sensor.
    pub const fn code(self) -> u8 {
        match self {
            Self::SetAutoCalibration => 0x79,
            Self::ReadCo2 => 0x86,
            Self::CalibrateZeroPoint => 0x87,
            Self::CalibrateSpanPoint => 0x88,
            Self::SetRange => 0x99,
            Self::GetAutoCalibration => 0x7D,
            Self::GetRange => 0x9B,
            Self::GetVersion => 0xA0,
        }
    }

    /// Whether the command is described in the sensor datasheet.
    pub const fn is_documented(self) -> bool {
        !matches!(
            self,
            Self::GetAutoCalibration | Self::GetRange | Self::GetVersion
        )
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x79 => Ok(Self::SetAutoCalibration),
            0x86 => Ok(Self::ReadCo2),
            0x87 => Ok(Self::CalibrateZeroPoint),
            0x88 => Ok(Self::CalibrateSpanPoint),
            0x99 => Ok(Self::SetRange),
            0x7D => Ok(Self::GetAutoCalibration),
            0x9B => Ok(Self::GetRange),
            0xA0 => Ok(Self::GetVersion),
            other => Err(other),
        }
    }
}
