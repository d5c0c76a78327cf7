//! GPIO Module
//!
//! Pin-level actuation consumed by the motor driver.
//!
//! ## Backends
//! - `SysfsGpio`: Linux `/sys/class/gpio` lines (Allwinner `Pxnn` pin names)
//! - `SimulatedGpio`: in-memory lines with a `SimProbe` for observation
//!
//! Pins are addressed by name so the same wiring table drives either backend.

mod sim;
mod sysfs;

pub use sim::{SimProbe, SimulatedGpio};
pub use sysfs::{sunxi_pin_number, SysfsGpio};

use crate::error::Result;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Output,
    Input,
}

/// Logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Hardware seam for one axis
///
/// `setup` may fail (missing driver, unknown pin). `output` is on the step
/// path and never fails; a backend that cannot write reports it through its
/// own logging.
pub trait PinBackend: Send {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Configure a pin
    fn setup(&mut self, pin: &str, mode: PinMode) -> Result<()>;

    /// Drive a pin
    fn output(&mut self, pin: &str, level: Level);

    /// Release every pin set up so far
    fn cleanup(&mut self);
}
