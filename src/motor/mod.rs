//! Motor Module
//!
//! Stepper motor descriptors and the per-axis step generator.
//!
//! ## Drivers
//! - Step/dir (A4988 style): one pulse per (micro)step, enable active low,
//!   optional microstep select lines
//! - Coils (ULN2003 style): four lines energized through a phase table
//!   (wave, full or half step)
//!
//! Pulse timing is sleep-based and best-effort, not hard real time.

mod driver;
mod pins;
mod profile;
mod sequence;

pub use driver::{MotionProgress, MotorDriver, MoveReport, PROGRESS_INTERVAL};
pub use pins::AxisPins;
pub use profile::MotorProfile;
pub use sequence::{microstep_pattern, StepSequence, StepTiming, MICROSTEP_DIVISORS};
