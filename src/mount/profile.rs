//! Mount descriptors
//!
//! Model ids and tracking modes as reported over the NexStar protocol, plus
//! the registry of known mounts.

use std::fmt;
use std::str::FromStr;

use crate::error::MountError;

/// NexStar hand-controller model id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Model {
    GpsSeries = 1,
    ISeries = 3,
    ISeriesSe = 4,
    Cge = 5,
    AdvancedGt = 6,
    Slt = 7,
    Cpc = 9,
    Gt = 10,
    Se45 = 11,
    Se68 = 12,
}

impl Model {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Model::GpsSeries),
            3 => Some(Model::ISeries),
            4 => Some(Model::ISeriesSe),
            5 => Some(Model::Cge),
            6 => Some(Model::AdvancedGt),
            7 => Some(Model::Slt),
            9 => Some(Model::Cpc),
            10 => Some(Model::Gt),
            11 => Some(Model::Se45),
            12 => Some(Model::Se68),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Axis semantics of the mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TrackingMode {
    #[default]
    Off = 0,
    AltAz = 1,
    EquatorialNorth = 2,
    EquatorialSouth = 3,
}

impl TrackingMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TrackingMode::Off),
            1 => Some(TrackingMode::AltAz),
            2 => Some(TrackingMode::EquatorialNorth),
            3 => Some(TrackingMode::EquatorialSouth),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// RA/Dec axes (polar aligned)
    pub fn is_equatorial(self) -> bool {
        matches!(
            self,
            TrackingMode::EquatorialNorth | TrackingMode::EquatorialSouth
        )
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackingMode::Off => "off",
            TrackingMode::AltAz => "alt-az",
            TrackingMode::EquatorialNorth => "eq-north",
            TrackingMode::EquatorialSouth => "eq-south",
        };
        f.write_str(name)
    }
}

/// Static mount descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountProfile {
    /// Registry key
    pub name: &'static str,
    pub model: Model,
    pub has_gps: bool,
    pub tracking_mode: TrackingMode,
}

impl MountProfile {
    pub const CGX: MountProfile = MountProfile {
        name: "Celestron_Montatura_CGX",
        model: Model::Cge,
        has_gps: true,
        tracking_mode: TrackingMode::EquatorialNorth,
    };

    pub const SE_5: MountProfile = MountProfile {
        name: "Celestron_SE_5",
        model: Model::Se45,
        has_gps: true,
        tracking_mode: TrackingMode::AltAz,
    };

    /// Home-built mount; the default
    pub const ASTRO_PI: MountProfile = MountProfile {
        name: "AstroPi",
        model: Model::AdvancedGt,
        has_gps: false,
        tracking_mode: TrackingMode::EquatorialNorth,
    };

    pub const ALL: [MountProfile; 3] = [Self::CGX, Self::SE_5, Self::ASTRO_PI];

    /// Look up a profile by name (case-insensitive)
    pub fn by_name(name: &str) -> Option<MountProfile> {
        Self::ALL
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .copied()
    }
}

impl Default for MountProfile {
    fn default() -> Self {
        Self::ASTRO_PI
    }
}

impl FromStr for MountProfile {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::by_name(s).ok_or_else(|| MountError::Config(format!("Unknown mount: {}", s)))
    }
}
