//! Motor profiles
//!
//! Static electrical/mechanical descriptors for the supported steppers.

/// Stepper motor descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorProfile {
    /// Registry key
    pub key: &'static str,

    /// Display name
    pub name: &'static str,

    /// Output turns per rotor turn (1/63.68 for a geared 28BYJ-48)
    pub gear_ratio: f64,

    /// Full steps per rotor revolution
    pub rotor_steps: u32,

    /// Rated voltage (V)
    pub rated_voltage: f64,

    /// Coil resistance (Ω)
    pub phase_resistance: f64,

    /// Highest speed level
    pub max_speed: u16,
}

impl MotorProfile {
    /// 28BYJ-48 geared unipolar stepper
    pub const BYJ_28: MotorProfile = MotorProfile {
        key: "28BYJ-48",
        name: "28BYJ-48",
        gear_ratio: 1.0 / 63.68395,
        rotor_steps: 64,
        rated_voltage: 5.0,
        phase_resistance: 50.0,
        max_speed: 1000,
    };

    /// NEMA 17 (17HS8401), direct drive
    pub const NEMA17: MotorProfile = MotorProfile {
        key: "NEMA17",
        name: "Nema 17 17HS8401",
        gear_ratio: 1.0,
        rotor_steps: 200,
        rated_voltage: 12.0,
        phase_resistance: 2.8,
        max_speed: 200,
    };

    /// Every known motor
    pub const ALL: [MotorProfile; 2] = [Self::BYJ_28, Self::NEMA17];

    /// Look up a profile by registry key (case-insensitive)
    pub fn by_key(key: &str) -> Option<MotorProfile> {
        Self::ALL
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .copied()
    }

    /// Full steps per output revolution, gearing included
    pub fn steps_per_revolution(&self) -> f64 {
        self.rotor_steps as f64 / self.gear_ratio
    }

    /// Full steps for a rotation (nearest step)
    pub fn steps_for_degrees(&self, degrees: f64) -> i64 {
        (degrees / 360.0 * self.steps_per_revolution()).round() as i64
    }

    /// Rotation produced by a number of full steps
    pub fn degrees_for_steps(&self, steps: i64) -> f64 {
        steps as f64 / self.steps_per_revolution() * 360.0
    }
}
