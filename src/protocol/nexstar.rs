//! NexStar engine
//!
//! Answers one decoded command per frame against the shared mount.

use std::sync::Arc;

use chrono::Utc;

use crate::coords::{Location, SkyCoordinate};
use crate::mount::{MountCoordinator, TrackingMode};
use super::clock::ClockReading;
use super::codec::{decode_command, encode_angle_pair};
use super::{Command, PassThrough, ProtocolHandler, Response};

/// Hand-controller firmware version reported by `V`
pub const APP_VERSION: [u8; 2] = [4, 10];

/// Firmware version of every pass-through device but the GPS
pub const DEVICE_VERSION: [u8; 2] = [1, 0];

pub const GPS_VERSION: [u8; 2] = [1, 3];

/// NexStar frames never exceed this
pub const RECV_BUFFER_SIZE: usize = 18;

/// Degrees moved per unit of pass-through slew rate
pub const NUDGE_DEGREES_PER_RATE: f64 = 1.0;

/// Offset between reported azimuth and the mount's horizontal axis
const AZIMUTH_OFFSET: f64 = 180.0;

/// Per-connection NexStar state
pub struct NexStarEngine {
    mount: Arc<MountCoordinator>,
    location: Location,
    goto_speed: u16,
}

impl NexStarEngine {
    pub fn new(mount: Arc<MountCoordinator>, goto_speed: u16) -> Self {
        let location = mount.location();
        Self {
            mount,
            location,
            goto_speed,
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Bytes to send back for one frame
    pub fn handle_frame(&mut self, frame: &[u8]) -> Response {
        if frame.is_empty() {
            return Response::none();
        }

        match decode_command(frame) {
            Ok(command) => {
                tracing::debug!("NexStar command: {:?}", command);
                self.execute(command, frame)
            }
            Err(e) => {
                tracing::debug!("NexStar frame {:02X?} rejected: {}", frame, e);
                Response::end()
            }
        }
    }

    fn execute(&mut self, command: Command, frame: &[u8]) -> Response {
        match command {
            Command::Zero => Response::raw(frame),
            Command::End => Response::none(),
            Command::Echo { payload } => Response::terminated(payload),
            Command::GetVersion => Response::terminated(APP_VERSION),
            Command::PassThrough(pass_through) => self.pass_through(pass_through),
            Command::GetModel => Response::terminated([self.mount.profile().model.id()]),

            Command::GetLocation => Response::terminated(self.location.to_bytes()),
            Command::SetLocation(location) => {
                self.location = location;
                self.mount.set_location(location);
                Response::end()
            }

            Command::GetTime => Response::terminated(ClockReading::now_local().to_bytes()),
            Command::SetTime(reading) => match reading.agrees_with(Utc::now()) {
                Ok(true) => Response::end(),
                Ok(false) => {
                    tracing::warn!("Client clock {:?} disagrees with system clock", reading);
                    Response::none()
                }
                Err(e) => {
                    tracing::warn!("Client clock rejected: {}", e);
                    Response::none()
                }
            },

            Command::GetTrackingMode => {
                Response::terminated([self.mount.tracking_mode().as_u8()])
            }
            Command::SetTrackingMode(value) => {
                match TrackingMode::from_u8(value) {
                    Some(mode) => self.mount.set_tracking_mode(mode),
                    None => tracing::debug!("Ignoring unknown tracking mode {}", value),
                }
                Response::end()
            }

            Command::IsAlignmentComplete => Response::terminated([1]),

            Command::SyncRaDec { ra, dec, .. } => {
                self.mount.set_sync(SkyCoordinate::new(ra, dec));
                Response::end()
            }
            Command::GotoRaDec { ra, dec, .. } => self.goto(SkyCoordinate::new(ra, dec)),
            Command::GotoAzAlt { az, alt, .. } => {
                self.goto(SkyCoordinate::new(az + AZIMUTH_OFFSET, alt))
            }
            Command::IsGotoInProgress => {
                Response::terminated([self.mount.is_goto_in_progress() as u8])
            }
            Command::CancelGoto => {
                self.mount.cancel_goto();
                Response::end()
            }

            Command::GetRaDec(precision) => {
                let current = self.mount.current();
                Response::terminated(encode_angle_pair(
                    current.horizontal(),
                    current.vertical(),
                    precision,
                ))
            }
            Command::GetAzAlt(precision) => {
                let current = self.mount.current();
                Response::terminated(encode_angle_pair(
                    current.horizontal() - AZIMUTH_OFFSET,
                    current.vertical(),
                    precision,
                ))
            }
        }
    }

    /// Blocks until the mount stops
    fn goto(&self, target: SkyCoordinate) -> Response {
        if let Err(e) = self.mount.goto(target, self.goto_speed) {
            tracing::warn!("Goto to {} failed: {}", target, e);
        }
        Response::end()
    }

    fn pass_through(&self, pass_through: PassThrough) -> Response {
        match pass_through {
            PassThrough::GpsLinked => Response::terminated([self.mount.profile().has_gps as u8]),
            PassThrough::GpsVersion => Response::terminated(GPS_VERSION),
            PassThrough::Gps { message } => {
                tracing::debug!("Unhandled GPS message {}", message);
                Response::end()
            }
            PassThrough::MotorSlew {
                axis,
                positive,
                rate,
            } => {
                if rate == 0 {
                    self.mount.cancel_goto();
                } else {
                    let magnitude = rate as f64 * NUDGE_DEGREES_PER_RATE;
                    let delta = if positive { magnitude } else { -magnitude };
                    if let Err(e) = self.mount.slew(axis, delta, rate as u16) {
                        tracing::warn!("Slew of {:?} failed: {}", axis, e);
                    }
                }
                Response::end()
            }
            PassThrough::DeviceVersion { .. } => Response::terminated(DEVICE_VERSION),
            PassThrough::Rtc { .. } => Response::end(),
        }
    }
}

impl ProtocolHandler for NexStarEngine {
    fn name(&self) -> &'static str {
        "nexstar"
    }

    fn recv_buffer_size(&self) -> usize {
        RECV_BUFFER_SIZE
    }

    fn handle_frame(&mut self, frame: &[u8]) -> Response {
        NexStarEngine::handle_frame(self, frame)
    }
}
