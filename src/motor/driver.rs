//! Motor driver
//!
//! Turns a signed rotation into timed pulses on one axis.
//!
//! ## Move Lifecycle
//! ```text
//! move_degrees ─► steps = round(Δ/360 · steps_per_rev · microstep)
//!      │
//!      ▼
//! move_steps ─► enable ─► [cancel? ─► pulse ─► progress?] × |steps| ─► disable
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{Sender, TrySendError};

use crate::error::{MountError, Result};
use crate::gpio::{Level, PinBackend, PinMode};
use super::{microstep_pattern, AxisPins, MotorProfile, StepSequence, StepTiming};

/// Minimum time between two progress reports of one move
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Microstep divisor selected at startup when MS lines exist
const DEFAULT_MICROSTEP: u8 = 16;

/// Progress of an in-flight move
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProgress {
    pub axis: String,
    pub completed: u64,
    pub total: u64,
    pub elapsed: Duration,
}

impl MotionProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn is_finished(&self) -> bool {
        self.completed == self.total
    }
}

/// Outcome of a move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReport {
    /// Signed pulse count asked for
    pub requested_steps: i64,

    /// Signed pulses actually emitted
    pub completed_steps: i64,

    /// Rotation actually performed, degrees
    pub degrees_moved: f64,

    pub cancelled: bool,
    pub elapsed: Duration,
}

impl MoveReport {
    fn idle() -> Self {
        Self {
            requested_steps: 0,
            completed_steps: 0,
            degrees_moved: 0.0,
            cancelled: false,
            elapsed: Duration::ZERO,
        }
    }
}

/// Step generator for one axis
pub struct MotorDriver {
    label: String,
    profile: MotorProfile,
    pins: AxisPins,
    backend: Box<dyn PinBackend>,
    microstep: u8,
    sequence: StepSequence,
    timing: StepTiming,
    timing_pinned: bool,
    phase: usize,
    active: bool,
    released: bool,
    progress: Option<Sender<MotionProgress>>,
}

impl MotorDriver {
    /// Set up every pin of the axis and leave it disabled
    ///
    /// A setup failure means the hardware is unusable; it is returned as
    /// `MountError::Hardware` for the caller to abort on.
    pub fn new(
        label: impl Into<String>,
        profile: MotorProfile,
        pins: AxisPins,
        backend: Box<dyn PinBackend>,
    ) -> Result<Self> {
        let label = label.into();
        let timing = match pins {
            AxisPins::StepDir { .. } => StepTiming::STEP_DIR,
            AxisPins::Coils(_) => StepSequence::Half.timing(),
        };

        let mut driver = Self {
            label,
            profile,
            pins,
            backend,
            microstep: 1,
            sequence: StepSequence::Half,
            timing,
            timing_pinned: false,
            phase: 0,
            active: false,
            released: false,
            progress: None,
        };
        driver.setup_pins()?;

        if driver.pins.has_microstep_lines() {
            driver.set_microstep(DEFAULT_MICROSTEP)?;
        } else {
            tracing::info!("[{}] Microstepping not configured (no MS lines)", driver.label);
        }

        tracing::info!(
            "[{}] Initialized '{}' on {} backend ({:.0} steps/rev)",
            driver.label,
            driver.profile.name,
            driver.backend.name(),
            driver.profile.steps_per_revolution()
        );

        Ok(driver)
    }

    fn setup_pins(&mut self) -> Result<()> {
        for pin in self.pins.all() {
            self.backend.setup(pin, PinMode::Output).map_err(|e| {
                MountError::Hardware(format!("[{}] pin {}: {}", self.label, pin, e))
            })?;
        }

        match &self.pins {
            AxisPins::StepDir {
                step, dir, enable, ..
            } => {
                self.backend.output(step, Level::Low);
                self.backend.output(dir, Level::Low);
                if let Some(enable) = enable {
                    self.backend.output(enable, Level::High);
                }
            }
            AxisPins::Coils(coils) => {
                for pin in coils {
                    self.backend.output(pin, Level::Low);
                }
            }
        }
        Ok(())
    }

    /// Pin the pulse delays, ignoring later sequence changes
    pub fn with_timing(mut self, timing: StepTiming) -> Self {
        self.timing = timing;
        self.timing_pinned = true;
        self
    }

    /// Receive rate-limited progress of every move
    ///
    /// Reports are dropped rather than blocking the step loop when the sink is full.
    pub fn set_progress_sink(&mut self, sink: Sender<MotionProgress>) {
        self.progress = Some(sink);
    }

    /// Select the microstep divisor (1, 2, 4, 8 or 16)
    pub fn set_microstep(&mut self, divisor: u8) -> Result<()> {
        let Some(levels) = microstep_pattern(divisor) else {
            tracing::warn!("[{}] Cannot set microstep 1/{}", self.label, divisor);
            return Err(MountError::InvalidMicrostep(divisor));
        };

        match &self.pins {
            AxisPins::StepDir { microstep, .. } if !microstep.is_empty() => {
                for (pin, high) in microstep.iter().zip(levels) {
                    self.backend.output(pin, Level::from(high));
                }
                self.microstep = divisor;
                tracing::info!("[{}] Microstep set to 1/{}", self.label, divisor);
                Ok(())
            }
            _ => {
                tracing::warn!(
                    "[{}] Cannot set microstep 1/{}: no MS lines",
                    self.label,
                    divisor
                );
                Err(MountError::Hardware(format!(
                    "[{}] axis has no microstep lines",
                    self.label
                )))
            }
        }
    }

    /// Select the coil sequence (coil drivers only)
    pub fn set_sequence(&mut self, sequence: StepSequence) -> Result<()> {
        if !matches!(self.pins, AxisPins::Coils(_)) {
            return Err(MountError::Hardware(format!(
                "[{}] step/dir driver has no coil sequence",
                self.label
            )));
        }

        self.sequence = sequence;
        self.phase = 0;
        if !self.timing_pinned {
            self.timing = sequence.timing();
        }
        tracing::info!(
            "[{}] Sequence {} ({} phases, {:?}-{:?})",
            self.label,
            sequence,
            sequence.pattern().len(),
            self.timing.min_delay,
            self.timing.max_delay
        );
        Ok(())
    }

    /// Pulses per output revolution at the current microstep
    pub fn steps_per_revolution(&self) -> f64 {
        self.profile.steps_per_revolution() * self.microstep as f64
    }

    /// Pulse count for a rotation (nearest pulse)
    pub fn steps_for_degrees(&self, degrees: f64) -> i64 {
        (degrees / 360.0 * self.steps_per_revolution()).round() as i64
    }

    /// Rotation for a pulse count
    pub fn degrees_for_steps(&self, steps: i64) -> f64 {
        steps as f64 / self.steps_per_revolution() * 360.0
    }

    /// Rotate by a signed angle
    ///
    /// Blocks for the whole move. `cancel` is polled before every pulse.
    pub fn move_degrees(&mut self, degrees: f64, speed: u16, cancel: &AtomicBool) -> MoveReport {
        let steps = self.steps_for_degrees(degrees);
        let speed = speed.clamp(1, self.profile.max_speed.max(1));

        tracing::info!(
            "[{}] Rotating {:.4}° ({} steps, {}), microstep 1/{}, speed {}",
            self.label,
            degrees,
            steps.unsigned_abs(),
            if steps >= 0 { "clockwise" } else { "counter-clockwise" },
            self.microstep,
            speed
        );

        self.move_steps(steps, speed, cancel)
    }

    /// Emit `|steps|` pulses in the direction of the sign
    pub fn move_steps(&mut self, steps: i64, speed: u16, cancel: &AtomicBool) -> MoveReport {
        if steps == 0 {
            return MoveReport::idle();
        }
        if self.released {
            tracing::warn!("[{}] Move ignored: driver released", self.label);
            return MoveReport::idle();
        }

        let forward = steps > 0;
        let total = steps.unsigned_abs();
        let delay = self.timing.delay_for(speed, self.profile.max_speed);
        tracing::debug!("[{}] Delay per step: {:?}", self.label, delay);

        self.activate();
        if let AxisPins::StepDir { dir, .. } = &self.pins {
            self.backend.output(dir, Level::from(forward));
        }

        let started = Instant::now();
        let mut last_report = started;
        let mut completed = 0u64;
        let mut cancelled = false;

        for _ in 0..total {
            if cancel.load(Ordering::Acquire) {
                cancelled = true;
                break;
            }

            self.pulse(forward, delay / 2);
            completed += 1;

            if last_report.elapsed() >= PROGRESS_INTERVAL {
                self.report_progress(completed, total, started);
                last_report = Instant::now();
            }
        }

        self.deactivate();
        self.report_progress(completed, total, started);

        let completed_steps = if forward {
            completed as i64
        } else {
            -(completed as i64)
        };
        let elapsed = started.elapsed();

        if cancelled {
            tracing::info!(
                "[{}] Move cancelled after {}/{} steps ({:.2}s)",
                self.label,
                completed,
                total,
                elapsed.as_secs_f64()
            );
        } else {
            tracing::info!("[{}] Move finished in {:.2}s", self.label, elapsed.as_secs_f64());
        }

        MoveReport {
            requested_steps: steps,
            completed_steps,
            degrees_moved: self.degrees_for_steps(completed_steps),
            cancelled,
            elapsed,
        }
    }

    /// One pulse: rising edge, hold, falling edge, hold
    fn pulse(&mut self, forward: bool, half_delay: Duration) {
        match &self.pins {
            AxisPins::StepDir { step, .. } => {
                self.backend.output(step, Level::High);
                thread::sleep(half_delay);
                self.backend.output(step, Level::Low);
                thread::sleep(half_delay);
            }
            AxisPins::Coils(coils) => {
                let table = self.sequence.pattern();
                let len = table.len();
                self.phase = if forward {
                    (self.phase + 1) % len
                } else {
                    (self.phase + len - 1) % len
                };
                for (pin, &on) in coils.iter().zip(table[self.phase].iter()) {
                    self.backend.output(pin, Level::from(on));
                }
                thread::sleep(half_delay);
                thread::sleep(half_delay);
            }
        }
    }

    fn report_progress(&mut self, completed: u64, total: u64, started: Instant) {
        let progress = MotionProgress {
            axis: self.label.clone(),
            completed,
            total,
            elapsed: started.elapsed(),
        };

        tracing::debug!(
            "[{}] Done {:.1}% ({}/{} steps, {:.2}s)",
            self.label,
            progress.percent(),
            completed,
            total,
            progress.elapsed.as_secs_f64()
        );

        // A full sink drops the report; the final one is not guaranteed either
        let disconnected = match &self.progress {
            Some(sink) => matches!(sink.try_send(progress), Err(TrySendError::Disconnected(_))),
            None => false,
        };
        if disconnected {
            self.progress = None;
        }
    }

    fn activate(&mut self) {
        if self.active {
            return;
        }
        if let AxisPins::StepDir {
            enable: Some(enable),
            ..
        } = &self.pins
        {
            self.backend.output(enable, Level::Low);
        }
        self.active = true;
        tracing::debug!("[{}] Driver enabled", self.label);
    }

    fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        match &self.pins {
            AxisPins::StepDir {
                enable: Some(enable),
                ..
            } => self.backend.output(enable, Level::High),
            AxisPins::StepDir { .. } => {}
            AxisPins::Coils(coils) => {
                for pin in coils {
                    self.backend.output(pin, Level::Low);
                }
            }
        }
        self.active = false;
        tracing::debug!("[{}] Driver disabled", self.label);
    }

    /// Disable the axis and hand the pins back; safe to call twice
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.deactivate();
        self.backend.cleanup();
        self.released = true;
        tracing::info!("[{}] Controller released", self.label);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn profile(&self) -> &MotorProfile {
        &self.profile
    }

    pub fn pins(&self) -> &AxisPins {
        &self.pins
    }

    pub fn microstep(&self) -> u8 {
        self.microstep
    }

    pub fn sequence(&self) -> StepSequence {
        self.sequence
    }

    pub fn timing(&self) -> StepTiming {
        self.timing
    }

    /// Enable line asserted (a move is running)
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for MotorDriver {
    fn drop(&mut self) {
        self.release();
    }
}
