//! Protocol codec
//!
//! Encoding and decoding functions for NexStar frames.
//!
//! ## Frame Layouts
//!
//! ### Angle Commands (S/s, R/r, B/b)
//! ```text
//! ┌────────┬──────────────┬───┬──────────────┬──────────┐
//! │ Letter │ HHHH[HHHH]   │ , │ VVVV[VVVV]   │ [#]      │
//! └────────┴──────────────┴───┴──────────────┴──────────┘
//! ```
//!
//! ### Pass-Through (P)
//! ```text
//! ┌───┬─────┬────────┬─────────┬────────────┬──────────┐
//! │ P │ len │ device │ message │ data (0-3) │ resp len │
//! └───┴─────┴────────┴─────────┴────────────┴──────────┘
//! ```
//!
//! ### Binary Records
//! - W: 8 location bytes (the east/west flag may be missing)
//! - H: 8 time bytes
//! - T: 1 tracking mode byte

use crate::coords::{degrees_to_hex, hex_to_degrees, Location, Precision};
use crate::error::{MountError, Result};
use crate::mount::Axis;
use super::clock::ClockReading;
use super::command::{device, message};
use super::response::TERMINATOR;
use super::{Command, CommandType, PassThrough};

/// Length of an encoded pass-through frame
pub const PASS_THROUGH_LEN: usize = 8;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
pub fn encode_command(command: &Command) -> Vec<u8> {
    let letter = command.command_type() as u8;
    let mut frame = vec![letter];

    match command {
        Command::Echo { payload } => frame.extend_from_slice(payload),
        Command::PassThrough(pass_through) => return encode_pass_through(pass_through),
        Command::SetLocation(location) => frame.extend_from_slice(&location.to_bytes()),
        Command::SetTime(reading) => frame.extend_from_slice(&reading.to_bytes()),
        Command::SetTrackingMode(mode) => frame.push(*mode),
        Command::SyncRaDec { ra, dec, precision } | Command::GotoRaDec { ra, dec, precision } => {
            frame.extend_from_slice(encode_angle_pair(*ra, *dec, *precision).as_bytes())
        }
        Command::GotoAzAlt { az, alt, precision } => {
            frame.extend_from_slice(encode_angle_pair(*az, *alt, *precision).as_bytes())
        }
        Command::Zero
        | Command::End
        | Command::GetVersion
        | Command::GetModel
        | Command::GetLocation
        | Command::GetTime
        | Command::GetTrackingMode
        | Command::IsAlignmentComplete
        | Command::IsGotoInProgress
        | Command::CancelGoto
        | Command::GetRaDec(_)
        | Command::GetAzAlt(_) => {}
    }

    frame
}

/// Decode one frame
///
/// Every byte after the letter belongs to this command.
pub fn decode_command(frame: &[u8]) -> Result<Command> {
    let Some((&letter, body)) = frame.split_first() else {
        return Err(MountError::Decode("Empty frame".to_string()));
    };

    let command_type =
        CommandType::from_u8(letter).ok_or(MountError::UnsupportedCommand(letter))?;
    let precision = command_type.precision();

    let command = match command_type {
        CommandType::Zero => Command::Zero,
        CommandType::End => Command::End,
        CommandType::Echo => Command::Echo {
            payload: body.to_vec(),
        },
        CommandType::GetVersion => Command::GetVersion,
        CommandType::PassThrough => Command::PassThrough(decode_pass_through(frame)?),
        CommandType::GetModel => Command::GetModel,
        CommandType::GetLocation => Command::GetLocation,
        CommandType::SetLocation => Command::SetLocation(Location::from_bytes(body)?),
        CommandType::GetTime => Command::GetTime,
        CommandType::SetTime => Command::SetTime(ClockReading::from_bytes(body)?),
        CommandType::GetTrackingMode => Command::GetTrackingMode,
        CommandType::SetTrackingMode => {
            let mode = body.first().copied().ok_or_else(|| {
                MountError::Decode("T command: missing mode byte".to_string())
            })?;
            Command::SetTrackingMode(mode)
        }
        CommandType::IsAlignmentComplete => Command::IsAlignmentComplete,
        CommandType::SyncRaDec | CommandType::SyncRaDecPrecise => {
            let (ra, dec) = decode_angle_pair(body, precision)?;
            Command::SyncRaDec { ra, dec, precision }
        }
        CommandType::GotoRaDec | CommandType::GotoRaDecPrecise => {
            let (ra, dec) = decode_angle_pair(body, precision)?;
            Command::GotoRaDec { ra, dec, precision }
        }
        CommandType::GotoAzAlt | CommandType::GotoAzAltPrecise => {
            let (az, alt) = decode_angle_pair(body, precision)?;
            Command::GotoAzAlt { az, alt, precision }
        }
        CommandType::IsGotoInProgress => Command::IsGotoInProgress,
        CommandType::CancelGoto => Command::CancelGoto,
        CommandType::GetRaDec | CommandType::GetRaDecPrecise => Command::GetRaDec(precision),
        CommandType::GetAzAlt | CommandType::GetAzAltPrecise => Command::GetAzAlt(precision),
    };

    Ok(command)
}

// =============================================================================
// Pass-Through
// =============================================================================

fn decode_pass_through(frame: &[u8]) -> Result<PassThrough> {
    if frame.len() < 4 {
        return Err(MountError::Decode(format!(
            "P command: expected at least 4 bytes, got {}",
            frame.len()
        )));
    }

    let target = frame[2];
    let msg = frame[3];

    let pass_through = match target {
        device::GPS => match msg {
            message::GPS_LINKED => PassThrough::GpsLinked,
            message::GET_VERSION => PassThrough::GpsVersion,
            other => PassThrough::Gps { message: other },
        },
        device::AZM_RA_MOTOR | device::ALT_DEC_MOTOR => match msg {
            message::MOVE_POSITIVE | message::MOVE_NEGATIVE => {
                let rate = frame.get(4).copied().ok_or_else(|| {
                    MountError::Decode("P command: slew without rate byte".to_string())
                })?;
                let axis = if target == device::AZM_RA_MOTOR {
                    Axis::Horizontal
                } else {
                    Axis::Vertical
                };
                PassThrough::MotorSlew {
                    axis,
                    positive: msg == message::MOVE_POSITIVE,
                    rate,
                }
            }
            _ => PassThrough::DeviceVersion { device: target },
        },
        device::RTC => PassThrough::Rtc { message: msg },
        other => PassThrough::DeviceVersion { device: other },
    };

    Ok(pass_through)
}

fn encode_pass_through(pass_through: &PassThrough) -> Vec<u8> {
    const NO_DATA: &[u8] = &[];

    let (target, msg, data, reply_len) = match pass_through {
        PassThrough::GpsLinked => (device::GPS, message::GPS_LINKED, NO_DATA, 1),
        PassThrough::GpsVersion => (device::GPS, message::GET_VERSION, NO_DATA, 2),
        PassThrough::Gps { message: id } => (device::GPS, *id, NO_DATA, 0),
        PassThrough::MotorSlew {
            axis,
            positive,
            rate,
        } => {
            let target = match axis {
                Axis::Horizontal => device::AZM_RA_MOTOR,
                Axis::Vertical => device::ALT_DEC_MOTOR,
            };
            let msg = if *positive {
                message::MOVE_POSITIVE
            } else {
                message::MOVE_NEGATIVE
            };
            (target, msg, std::slice::from_ref(rate), 0)
        }
        PassThrough::DeviceVersion { device: id } => (*id, message::GET_VERSION, NO_DATA, 2),
        PassThrough::Rtc { message: id } => (device::RTC, *id, NO_DATA, 0),
    };

    let mut frame = Vec::with_capacity(PASS_THROUGH_LEN);
    frame.push(CommandType::PassThrough as u8);
    frame.push(data.len() as u8 + 1);
    frame.push(target);
    frame.push(msg);
    frame.extend_from_slice(data);
    frame.resize(PASS_THROUGH_LEN - 1, 0);
    frame.push(reply_len);
    frame
}

// =============================================================================
// Angle Fields
// =============================================================================

/// Encode two angles as `HHHH,VVVV` (or 8 digits each when precise)
pub fn encode_angle_pair(horizontal: f64, vertical: f64, precision: Precision) -> String {
    format!(
        "{},{}",
        degrees_to_hex(horizontal, precision),
        degrees_to_hex(vertical, precision)
    )
}

/// Decode `HHHH,VVVV` with at most one trailing `#`
pub fn decode_angle_pair(field: &[u8], precision: Precision) -> Result<(f64, f64)> {
    let field = field.strip_suffix(&[TERMINATOR]).unwrap_or(field);
    let text = std::str::from_utf8(field)
        .map_err(|_| MountError::Decode("Angle fields: not ASCII".to_string()))?;

    let mut parts = text.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) => Ok((
            hex_to_degrees(first, precision)?,
            hex_to_degrees(second, precision)?,
        )),
        _ => Err(MountError::Decode(format!(
            "Angle fields '{}': expected two comma-separated fields",
            text
        ))),
    }
}
