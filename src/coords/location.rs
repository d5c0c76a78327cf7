//! Observer location
//!
//! Latitude/longitude in degree-minute-second form, as carried by the
//! NexStar `W`/`w` commands.
//!
//! ## Wire Format
//! ```text
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │ A   │ B   │ C   │ D   │ E   │ F   │ G   │ H   │
//! │ lat │ lat │ lat │ 0=N │ lon │ lon │ lon │ 0=E │
//! │ deg │ min │ sec │ 1=S │ deg │ min │ sec │ 1=W │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//! ```

use std::fmt;

use crate::error::{MountError, Result};

/// Bytes in a full location record
pub const LOCATION_BYTES: usize = 8;

/// Degree-minute-second triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dms {
    pub degrees: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl Dms {
    pub fn new(degrees: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            degrees,
            minutes,
            seconds,
        }
    }

    /// Unsigned decimal degrees
    pub fn to_degrees(&self) -> f64 {
        self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds as f64 / 3600.0
    }
}

impl fmt::Display for Dms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°{}'{}\"", self.degrees, self.minutes, self.seconds)
    }
}

/// Observer position on Earth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub latitude: Dms,
    pub longitude: Dms,

    /// Southern hemisphere
    pub south: bool,

    /// Western hemisphere
    pub west: bool,
}

impl Location {
    /// North/east location from two DMS triples
    pub fn from_lat_long(
        lat_deg: u8,
        lat_min: u8,
        lat_sec: u8,
        long_deg: u8,
        long_min: u8,
        long_sec: u8,
    ) -> Self {
        Self {
            latitude: Dms::new(lat_deg, lat_min, lat_sec),
            longitude: Dms::new(long_deg, long_min, long_sec),
            south: false,
            west: false,
        }
    }

    /// Parse a location record (7 or 8 bytes, the east/west flag may be absent)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LOCATION_BYTES - 1 {
            return Err(MountError::Decode(format!(
                "Location: expected at least {} bytes, got {}",
                LOCATION_BYTES - 1,
                bytes.len()
            )));
        }

        Ok(Self {
            latitude: Dms::new(bytes[0], bytes[1], bytes[2]),
            south: bytes[3] != 0,
            longitude: Dms::new(bytes[4], bytes[5], bytes[6]),
            west: bytes.get(7).map(|&b| b != 0).unwrap_or(false),
        })
    }

    /// Serialize to the 8-byte wire record
    pub fn to_bytes(&self) -> [u8; LOCATION_BYTES] {
        [
            self.latitude.degrees,
            self.latitude.minutes,
            self.latitude.seconds,
            self.south as u8,
            self.longitude.degrees,
            self.longitude.minutes,
            self.longitude.seconds,
            self.west as u8,
        ]
    }

    /// Signed latitude, north positive
    pub fn latitude_degrees(&self) -> f64 {
        let lat = self.latitude.to_degrees();
        if self.south {
            -lat
        } else {
            lat
        }
    }

    /// Signed longitude, east positive
    pub fn longitude_degrees(&self) -> f64 {
        let long = self.longitude.to_degrees();
        if self.west {
            -long
        } else {
            long
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {} {}",
            self.latitude,
            if self.south { "S" } else { "N" },
            self.longitude,
            if self.west { "W" } else { "E" }
        )
    }
}
