//! Configuration for AstroPi
//!
//! Centralized configuration with sensible defaults.

use std::str::FromStr;

use crate::coords::Location;
use crate::error::MountError;
use crate::motor::{AxisPins, MotorProfile, StepSequence, StepTiming};
use crate::mount::MountProfile;

/// Main configuration for an AstroPi server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Wire protocol spoken to clients
    pub protocol: ProtocolVariant,

    /// Serve one client at a time on the accept thread
    pub synchronous: bool,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Mount Configuration
    // -------------------------------------------------------------------------
    /// Static mount descriptor (model id, gps, tracking mode)
    pub mount_profile: MountProfile,

    /// Observer location reported before a client sets one
    pub location: Location,

    /// Speed level used for goto commands
    pub goto_speed: u8,

    // -------------------------------------------------------------------------
    // Motor Configuration
    // -------------------------------------------------------------------------
    /// Actuation backend for both axes
    pub motor_backend: MotorBackend,

    /// Stepper motor model fitted to both axes
    pub motor_profile: MotorProfile,

    /// Microstep divisor for step/dir drivers
    pub microstep: u8,

    /// Coil sequence for coil-driven motors
    pub sequence: StepSequence,

    /// Overrides the per-mode pulse delays when set
    pub step_timing: Option<StepTiming>,

    /// Wiring of the RA/Az axis
    pub pins_h: AxisPins,

    /// Wiring of the Dec/Alt axis
    pub pins_v: AxisPins,
}

/// Client protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVariant {
    /// Celestron NexStar binary protocol
    NexStar,

    /// Meade LX200 text protocol (minimal subset)
    Lx200,
}

impl FromStr for ProtocolVariant {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nexstar" => Ok(ProtocolVariant::NexStar),
            "lx200" => Ok(ProtocolVariant::Lx200),
            other => Err(MountError::Config(format!("Unknown protocol: {}", other))),
        }
    }
}

/// Where step pulses go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorBackend {
    /// Linux GPIO lines (sysfs)
    Real,

    /// In-memory simulator
    Simulated,
}

impl FromStr for MotorBackend {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "real" => Ok(MotorBackend::Real),
            "sim" | "simulated" => Ok(MotorBackend::Simulated),
            other => Err(MountError::Config(format!("Unknown motor backend: {}", other))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4030".to_string(),
            protocol: ProtocolVariant::NexStar,
            synchronous: false,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
            mount_profile: MountProfile::ASTRO_PI,
            location: Location::from_lat_long(58, 0, 54, 56, 16, 28),
            goto_speed: 10,
            motor_backend: MotorBackend::Real,
            motor_profile: MotorProfile::NEMA17,
            microstep: 16,
            sequence: StepSequence::Half,
            step_timing: None,
            pins_h: AxisPins::default_ra_az(),
            pins_v: AxisPins::default_dec_alt(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the client protocol
    pub fn protocol(mut self, protocol: ProtocolVariant) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Serve clients one at a time
    pub fn synchronous(mut self, synchronous: bool) -> Self {
        self.config.synchronous = synchronous;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the mount profile
    pub fn mount_profile(mut self, profile: MountProfile) -> Self {
        self.config.mount_profile = profile;
        self
    }

    /// Set the initial observer location
    pub fn location(mut self, location: Location) -> Self {
        self.config.location = location;
        self
    }

    /// Set the goto speed level
    pub fn goto_speed(mut self, speed: u8) -> Self {
        self.config.goto_speed = speed;
        self
    }

    /// Set the motor backend
    pub fn motor_backend(mut self, backend: MotorBackend) -> Self {
        self.config.motor_backend = backend;
        self
    }

    /// Set the motor profile
    pub fn motor_profile(mut self, profile: MotorProfile) -> Self {
        self.config.motor_profile = profile;
        self
    }

    /// Set the microstep divisor
    pub fn microstep(mut self, divisor: u8) -> Self {
        self.config.microstep = divisor;
        self
    }

    /// Set the coil sequence
    pub fn sequence(mut self, sequence: StepSequence) -> Self {
        self.config.sequence = sequence;
        self
    }

    /// Override pulse delays for both axes
    pub fn step_timing(mut self, timing: StepTiming) -> Self {
        self.config.step_timing = Some(timing);
        self
    }

    /// Set the wiring of both axes
    pub fn pins(mut self, pins_h: AxisPins, pins_v: AxisPins) -> Self {
        self.config.pins_h = pins_h;
        self.config.pins_v = pins_v;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
