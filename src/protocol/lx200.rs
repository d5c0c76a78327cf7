//! LX200 engine
//!
//! Minimal Meade LX200 text protocol. A frame may carry several
//! `:XX...#` commands; their replies are concatenated in order.
//!
//! | Command            | Reply                          |
//! |--------------------|--------------------------------|
//! | `ACK` (0x06)       | `P` equatorial, `A` alt-az     |
//! | `:GR#` / `:GD#`    | `HH:MM:SS#` / `sDD*MM#`        |
//! | `:Gt#` / `:Gg#`    | `sDD*MM#` / `DDD*MM#`          |
//! | `:Sr..#` / `:Sd..#`| `1` valid, `0` invalid         |
//! | `:MS#`             | `0`, or `1No target#`          |
//! | `:CM#`             | `M31#`                         |
//! | `:Q#`              | `1`                            |

use std::sync::Arc;

use crate::coords::{Dms, SkyCoordinate};
use crate::mount::MountCoordinator;
use super::{ProtocolHandler, Response};

/// LX200 frames never exceed this
pub const RECV_BUFFER_SIZE: usize = 32;

const ACK: char = '\u{6}';

/// Per-connection LX200 state
pub struct Lx200Engine {
    mount: Arc<MountCoordinator>,
    goto_speed: u16,

    /// RA from `:Sr`, degrees
    target_ra: Option<f64>,

    /// Dec from `:Sd`, degrees
    target_dec: Option<f64>,
}

impl Lx200Engine {
    pub fn new(mount: Arc<MountCoordinator>, goto_speed: u16) -> Self {
        Self {
            mount,
            goto_speed,
            target_ra: None,
            target_dec: None,
        }
    }

    pub fn handle_frame(&mut self, frame: &[u8]) -> Response {
        if frame.is_empty() {
            return Response::none();
        }
        let text = match std::str::from_utf8(frame) {
            Ok(text) if text.is_ascii() => text,
            _ => {
                tracing::debug!("LX200 frame {:02X?} is not ASCII", frame);
                return Response::end();
            }
        };

        let mut replies = Vec::new();
        let mut rest = text;

        while let Some(c) = rest.chars().next() {
            match c {
                ACK => {
                    replies.push(self.ack());
                    rest = &rest[1..];
                }
                ':' => match rest[1..].find('#') {
                    Some(end) => {
                        let body = &rest[1..end + 1];
                        tracing::debug!("LX200 command: :{}#", body);
                        replies.push(self.execute(body));
                        rest = &rest[end + 2..];
                    }
                    None => {
                        tracing::debug!("LX200 unterminated command '{}'", rest);
                        break;
                    }
                },
                // '#' padding and stray bytes
                _ => rest = &rest[1..],
            }
        }

        Response::concat(replies)
    }

    fn ack(&self) -> Response {
        if self.mount.tracking_mode().is_equatorial() {
            Response::raw("P")
        } else {
            Response::raw("A")
        }
    }

    fn execute(&mut self, body: &str) -> Response {
        if let Some(value) = body.strip_prefix("Sr") {
            return self.set_target_ra(value.trim());
        }
        if let Some(value) = body.strip_prefix("Sd") {
            return self.set_target_dec(value.trim());
        }

        match body {
            "GR" => Response::terminated(format_ra(self.mount.current().horizontal())),
            "GD" => Response::terminated(format_dec(self.mount.current().vertical())),
            "Gt" => {
                let location = self.mount.location();
                Response::terminated(format_dms_signed(&location.latitude, location.south))
            }
            "Gg" => {
                let location = self.mount.location();
                Response::terminated(format!(
                    "{:03}*{:02}",
                    location.longitude.degrees, location.longitude.minutes
                ))
            }
            "MS" => self.slew_to_target(),
            "CM" => {
                self.mount.set_sync(self.pending_target());
                Response::terminated("M31")
            }
            "Q" => {
                self.mount.cancel_goto();
                Response::raw("1")
            }
            other => {
                tracing::debug!("Ignoring LX200 command :{}#", other);
                Response::none()
            }
        }
    }

    fn set_target_ra(&mut self, value: &str) -> Response {
        match parse_ra(value) {
            Some(ra) => {
                self.target_ra = Some(ra);
                Response::raw("1")
            }
            None => Response::raw("0"),
        }
    }

    fn set_target_dec(&mut self, value: &str) -> Response {
        match parse_dec(value) {
            Some(dec) => {
                self.target_dec = Some(dec);
                Response::raw("1")
            }
            None => Response::raw("0"),
        }
    }

    /// Pending target, axes not set falling back to the current position
    fn pending_target(&self) -> SkyCoordinate {
        let current = self.mount.current();
        SkyCoordinate::new(
            self.target_ra.unwrap_or(current.horizontal()),
            self.target_dec.unwrap_or(current.vertical()),
        )
    }

    fn slew_to_target(&mut self) -> Response {
        if self.target_ra.is_none() && self.target_dec.is_none() {
            return Response::raw("1No target#");
        }

        let target = self.pending_target();
        match self.mount.goto(target, self.goto_speed) {
            Ok(_) => Response::raw("0"),
            Err(e) => {
                tracing::warn!("LX200 goto to {} failed: {}", target, e);
                Response::raw("1No target#")
            }
        }
    }
}

impl ProtocolHandler for Lx200Engine {
    fn name(&self) -> &'static str {
        "lx200"
    }

    fn recv_buffer_size(&self) -> usize {
        RECV_BUFFER_SIZE
    }

    fn handle_frame(&mut self, frame: &[u8]) -> Response {
        Lx200Engine::handle_frame(self, frame)
    }
}

// =============================================================================
// Sexagesimal Fields
// =============================================================================

/// RA degrees as `HH:MM:SS`
pub fn format_ra(degrees: f64) -> String {
    let total = (degrees / 15.0 * 3600.0).round() as i64;
    let total = total.rem_euclid(24 * 3600);
    format!("{:02}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

/// Dec degrees as `sDD*MM`
pub fn format_dec(degrees: f64) -> String {
    let sign = if degrees < 0.0 { '-' } else { '+' };
    let minutes = (degrees.abs() * 60.0).round() as i64;
    format!("{}{:02}*{:02}", sign, minutes / 60, minutes % 60)
}

fn format_dms_signed(dms: &Dms, negative: bool) -> String {
    let sign = if negative { '-' } else { '+' };
    format!("{}{:02}*{:02}", sign, dms.degrees, dms.minutes)
}

/// `HH:MM:SS` (or `HH:MM`) into degrees
pub fn parse_ra(value: &str) -> Option<f64> {
    let mut parts = value.split(':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds: u32 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some((hours as f64 + minutes as f64 / 60.0 + seconds as f64 / 3600.0) * 15.0)
}

/// `sDD*MM[:SS]` into degrees
pub fn parse_dec(value: &str) -> Option<f64> {
    let (negative, unsigned) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };

    let mut parts = unsigned.split(&['*', ':'][..]);
    let degrees: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds: u32 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let magnitude = degrees as f64 + minutes as f64 / 60.0 + seconds as f64 / 3600.0;
    if magnitude > 90.0 {
        return None;
    }
    Some(if negative { -magnitude } else { magnitude })
}
