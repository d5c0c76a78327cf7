//! Step sequences and pulse timing

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::MountError;

/// Supported microstep divisors
pub const MICROSTEP_DIVISORS: [u8; 5] = [1, 2, 4, 8, 16];

/// MS1/MS2/MS3 levels for a microstep divisor
pub fn microstep_pattern(divisor: u8) -> Option<[bool; 3]> {
    match divisor {
        1 => Some([false, false, false]),
        2 => Some([true, false, false]),
        4 => Some([false, true, false]),
        8 => Some([true, true, false]),
        16 => Some([true, true, true]),
        _ => None,
    }
}

const WAVE: [[bool; 4]; 4] = [
    [true, false, false, false],
    [false, true, false, false],
    [false, false, true, false],
    [false, false, false, true],
];

const FULL: [[bool; 4]; 4] = [
    [true, true, false, false],
    [false, true, true, false],
    [false, false, true, true],
    [true, false, false, true],
];

const HALF: [[bool; 4]; 8] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

/// Coil energizing pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepSequence {
    /// One coil at a time
    Wave,

    /// Two coils at a time
    Full,

    /// Alternating one and two coils, 8 phases
    #[default]
    Half,
}

impl StepSequence {
    /// Phase table, one row per phase
    pub fn pattern(self) -> &'static [[bool; 4]] {
        match self {
            StepSequence::Wave => &WAVE,
            StepSequence::Full => &FULL,
            StepSequence::Half => &HALF,
        }
    }

    /// Default pulse delays for this mode
    pub fn timing(self) -> StepTiming {
        match self {
            StepSequence::Wave => StepTiming::from_millis(5, 20),
            StepSequence::Full => StepTiming::from_millis(4, 15),
            StepSequence::Half => StepTiming::from_millis(1, 10),
        }
    }
}

impl fmt::Display for StepSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepSequence::Wave => "wave",
            StepSequence::Full => "full",
            StepSequence::Half => "half",
        };
        f.write_str(name)
    }
}

impl FromStr for StepSequence {
    type Err = MountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wave" => Ok(StepSequence::Wave),
            "full" => Ok(StepSequence::Full),
            "half" => Ok(StepSequence::Half),
            other => Err(MountError::Config(format!("Unknown step sequence: {}", other))),
        }
    }
}

/// Delay range between pulses
///
/// Speed level 1 uses `max_delay`, the motor's top speed uses `min_delay`,
/// and levels in between are interpolated linearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTiming {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl StepTiming {
    /// Step/dir driver defaults
    pub const STEP_DIR: StepTiming = StepTiming::from_millis(1, 20);

    pub const fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay,
        }
    }

    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    /// Per-step delay for a speed level in `[1, max_speed]`
    pub fn delay_for(&self, speed: u16, max_speed: u16) -> Duration {
        if max_speed <= 1 {
            return self.max_delay;
        }

        let speed = speed.clamp(1, max_speed);
        let max = self.max_delay.as_secs_f64();
        let min = self.min_delay.as_secs_f64();
        let delay = max - (speed - 1) as f64 * (max - min) / (max_speed - 1) as f64;

        Duration::from_secs_f64(delay.max(0.0))
    }
}
