//! Command definitions
//!
//! NexStar requests after decoding. One frame carries one command.

use crate::coords::{Location, Precision};
use crate::mount::Axis;
use super::clock::ClockReading;

/// Leading byte of each NexStar command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Zero = 0x00,
    End = b'#',
    Echo = b'K',
    GetVersion = b'V',
    PassThrough = b'P',
    GetModel = b'm',
    GetLocation = b'w',
    SetLocation = b'W',
    GetTime = b'h',
    SetTime = b'H',
    GetTrackingMode = b't',
    SetTrackingMode = b'T',
    IsAlignmentComplete = b'J',
    SyncRaDec = b'S',
    SyncRaDecPrecise = b's',
    GotoRaDec = b'R',
    GotoRaDecPrecise = b'r',
    GotoAzAlt = b'B',
    GotoAzAltPrecise = b'b',
    IsGotoInProgress = b'L',
    CancelGoto = b'M',
    GetRaDec = b'E',
    GetRaDecPrecise = b'e',
    GetAzAlt = b'Z',
    GetAzAltPrecise = b'z',
}

impl CommandType {
    pub fn from_u8(byte: u8) -> Option<Self> {
        let command_type = match byte {
            0x00 => CommandType::Zero,
            b'#' => CommandType::End,
            b'K' => CommandType::Echo,
            b'V' => CommandType::GetVersion,
            b'P' => CommandType::PassThrough,
            b'm' => CommandType::GetModel,
            b'w' => CommandType::GetLocation,
            b'W' => CommandType::SetLocation,
            b'h' => CommandType::GetTime,
            b'H' => CommandType::SetTime,
            b't' => CommandType::GetTrackingMode,
            b'T' => CommandType::SetTrackingMode,
            b'J' => CommandType::IsAlignmentComplete,
            b'S' => CommandType::SyncRaDec,
            b's' => CommandType::SyncRaDecPrecise,
            b'R' => CommandType::GotoRaDec,
            b'r' => CommandType::GotoRaDecPrecise,
            b'B' => CommandType::GotoAzAlt,
            b'b' => CommandType::GotoAzAltPrecise,
            b'L' => CommandType::IsGotoInProgress,
            b'M' => CommandType::CancelGoto,
            b'E' => CommandType::GetRaDec,
            b'e' => CommandType::GetRaDecPrecise,
            b'Z' => CommandType::GetAzAlt,
            b'z' => CommandType::GetAzAltPrecise,
            _ => return None,
        };
        Some(command_type)
    }

    /// Angle precision implied by the letter case
    pub fn precision(self) -> Precision {
        match self {
            CommandType::SyncRaDecPrecise
            | CommandType::GotoRaDecPrecise
            | CommandType::GotoAzAltPrecise
            | CommandType::GetRaDecPrecise
            | CommandType::GetAzAltPrecise => Precision::Precise,
            _ => Precision::Standard,
        }
    }
}

/// Pass-through device ids
pub mod device {
    pub const AZM_RA_MOTOR: u8 = 16;
    pub const ALT_DEC_MOTOR: u8 = 17;
    pub const GPS: u8 = 176;
    pub const RTC: u8 = 178;
}

/// Pass-through message ids
pub mod message {
    pub const GPS_LINKED: u8 = 55;
    pub const MOVE_POSITIVE: u8 = 36;
    pub const MOVE_NEGATIVE: u8 = 37;
    pub const GET_VERSION: u8 = 254;
}

/// Pass-through request to an auxiliary device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassThrough {
    /// Does the GPS have a fix
    GpsLinked,

    GpsVersion,

    /// Any other GPS message
    Gps { message: u8 },

    /// Fixed-rate slew of one axis; rate 0 stops
    MotorSlew { axis: Axis, positive: bool, rate: u8 },

    /// Version of a motor board or an unknown device
    DeviceVersion { device: u8 },

    /// Real-time clock message
    Rtc { message: u8 },
}

/// A parsed NexStar command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Bare 0x00, answered with itself
    Zero,

    /// Bare `#`
    End,

    /// Echo the payload back
    Echo { payload: Vec<u8> },

    GetVersion,
    PassThrough(PassThrough),
    GetModel,
    GetLocation,
    SetLocation(Location),
    GetTime,
    SetTime(ClockReading),
    GetTrackingMode,

    /// Raw mode byte; values outside the known modes are ignored
    SetTrackingMode(u8),

    IsAlignmentComplete,
    SyncRaDec { ra: f64, dec: f64, precision: Precision },
    GotoRaDec { ra: f64, dec: f64, precision: Precision },
    GotoAzAlt { az: f64, alt: f64, precision: Precision },
    IsGotoInProgress,
    CancelGoto,
    GetRaDec(Precision),
    GetAzAlt(Precision),
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        let precise = |p: &Precision| *p == Precision::Precise;
        match self {
            Command::Zero => CommandType::Zero,
            Command::End => CommandType::End,
            Command::Echo { .. } => CommandType::Echo,
            Command::GetVersion => CommandType::GetVersion,
            Command::PassThrough(_) => CommandType::PassThrough,
            Command::GetModel => CommandType::GetModel,
            Command::GetLocation => CommandType::GetLocation,
            Command::SetLocation(_) => CommandType::SetLocation,
            Command::GetTime => CommandType::GetTime,
            Command::SetTime(_) => CommandType::SetTime,
            Command::GetTrackingMode => CommandType::GetTrackingMode,
            Command::SetTrackingMode(_) => CommandType::SetTrackingMode,
            Command::IsAlignmentComplete => CommandType::IsAlignmentComplete,
            Command::SyncRaDec { precision, .. } if precise(precision) => {
                CommandType::SyncRaDecPrecise
            }
            Command::SyncRaDec { .. } => CommandType::SyncRaDec,
            Command::GotoRaDec { precision, .. } if precise(precision) => {
                CommandType::GotoRaDecPrecise
            }
            Command::GotoRaDec { .. } => CommandType::GotoRaDec,
            Command::GotoAzAlt { precision, .. } if precise(precision) => {
                CommandType::GotoAzAltPrecise
            }
            Command::GotoAzAlt { .. } => CommandType::GotoAzAlt,
            Command::IsGotoInProgress => CommandType::IsGotoInProgress,
            Command::CancelGoto => CommandType::CancelGoto,
            Command::GetRaDec(p) if precise(p) => CommandType::GetRaDecPrecise,
            Command::GetRaDec(_) => CommandType::GetRaDec,
            Command::GetAzAlt(p) if precise(p) => CommandType::GetAzAltPrecise,
            Command::GetAzAlt(_) => CommandType::GetAzAlt,
        }
    }

    /// Commands that physically move the mount
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Command::GotoRaDec { .. }
                | Command::GotoAzAlt { .. }
                | Command::PassThrough(PassThrough::MotorSlew { .. })
        )
    }
}
