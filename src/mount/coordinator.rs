//! Mount coordinator
//!
//! Owns both motor drivers and the shared pointing state. Protocol engines on
//! any connection thread call into one shared `MountCoordinator`.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;

use crate::config::{Config, MotorBackend};
use crate::coords::{shortest_delta, Location, SkyCoordinate};
use crate::error::{MountError, Result};
use crate::gpio::{PinBackend, SimulatedGpio, SysfsGpio};
use crate::motor::{AxisPins, MotionProgress, MotorDriver, MoveReport};
use super::{MountProfile, TrackingMode};

/// Progress reports buffered for subscribers before new ones are dropped
const PROGRESS_BACKLOG: usize = 64;

/// Mount axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// RA or Az
    Horizontal,

    /// Dec or Alt
    Vertical,
}

/// Consistent copy of the coordinator state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountState {
    /// Believed pointing
    pub current: SkyCoordinate,

    /// Last position declared by a sync
    pub sync: SkyCoordinate,

    pub goto_in_progress: bool,
    pub location: Location,
    pub tracking_mode: TrackingMode,
}

/// Coordinates the two axes of a mount
///
/// ## Locking
///
/// - `state`: every mutable field, held only for short reads and updates,
///   never across a move
/// - `motion`: serializes gotos and slews; held for the whole move
/// - `motor_h` / `motor_v`: one per axis, taken by the axis thread
///
/// Order is always `motion` → motor → `state`.
pub struct MountCoordinator {
    profile: MountProfile,
    state: Mutex<MountState>,
    motion: Mutex<()>,
    motor_h: Mutex<MotorDriver>,
    motor_v: Mutex<MotorDriver>,
    cancel: AtomicBool,
    progress: Receiver<MotionProgress>,
}

/// Clears `goto_in_progress` when the move ends, however it ends
struct GotoGuard<'a> {
    state: &'a Mutex<MountState>,
}

impl<'a> GotoGuard<'a> {
    fn start(state: &'a Mutex<MountState>) -> (Self, MountState) {
        let snapshot = {
            let mut state = state.lock();
            state.goto_in_progress = true;
            *state
        };
        (Self { state }, snapshot)
    }
}

impl Drop for GotoGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().goto_in_progress = false;
    }
}

impl MountCoordinator {
    /// Assemble a coordinator from two ready drivers
    ///
    /// The starting tracking mode comes from the profile.
    pub fn new(
        profile: MountProfile,
        mut motor_h: MotorDriver,
        mut motor_v: MotorDriver,
        location: Location,
    ) -> Self {
        let (sink, progress) = channel::bounded(PROGRESS_BACKLOG);
        motor_h.set_progress_sink(sink.clone());
        motor_v.set_progress_sink(sink);

        Self {
            profile,
            state: Mutex::new(MountState {
                current: SkyCoordinate::zero(),
                sync: SkyCoordinate::zero(),
                goto_in_progress: false,
                location,
                tracking_mode: profile.tracking_mode,
            }),
            motion: Mutex::new(()),
            motor_h: Mutex::new(motor_h),
            motor_v: Mutex::new(motor_v),
            cancel: AtomicBool::new(false),
            progress,
        }
    }

    /// Build drivers for both axes as configured
    ///
    /// A `Real` backend that cannot be opened is an error; there is no
    /// silent fallback to the simulator.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (label_h, label_v) = if config.mount_profile.tracking_mode.is_equatorial() {
            ("Ra", "Dec")
        } else {
            ("Az", "Alt")
        };

        let (backend_h, backend_v): (Box<dyn PinBackend>, Box<dyn PinBackend>) =
            match config.motor_backend {
                MotorBackend::Real => (Box::new(SysfsGpio::open()?), Box::new(SysfsGpio::open()?)),
                MotorBackend::Simulated => {
                    (Box::new(SimulatedGpio::new()), Box::new(SimulatedGpio::new()))
                }
            };

        let motor_h = Self::build_motor(label_h, config, config.pins_h.clone(), backend_h)?;
        let motor_v = Self::build_motor(label_v, config, config.pins_v.clone(), backend_v)?;

        tracing::info!(
            "Mount '{}' ({:?}, {}) ready",
            config.mount_profile.name,
            config.mount_profile.model,
            config.mount_profile.tracking_mode
        );

        Ok(Self::new(
            config.mount_profile,
            motor_h,
            motor_v,
            config.location,
        ))
    }

    fn build_motor(
        label: &str,
        config: &Config,
        pins: AxisPins,
        backend: Box<dyn PinBackend>,
    ) -> Result<MotorDriver> {
        let mut motor = MotorDriver::new(label, config.motor_profile, pins, backend)?;
        if let Some(timing) = config.step_timing {
            motor = motor.with_timing(timing);
        }

        if matches!(motor.pins(), AxisPins::Coils(_)) {
            motor.set_sequence(config.sequence)?;
        } else if motor.pins().has_microstep_lines() {
            motor.set_microstep(config.microstep)?;
        }
        Ok(motor)
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn profile(&self) -> &MountProfile {
        &self.profile
    }

    pub fn location(&self) -> Location {
        self.state.lock().location
    }

    pub fn set_location(&self, location: Location) {
        self.state.lock().location = location;
        tracing::info!("Location set to {}", location);
    }

    pub fn tracking_mode(&self) -> TrackingMode {
        self.state.lock().tracking_mode
    }

    pub fn set_tracking_mode(&self, mode: TrackingMode) {
        self.state.lock().tracking_mode = mode;
        tracing::info!("Tracking mode set to {}", mode);
    }

    pub fn current(&self) -> SkyCoordinate {
        self.state.lock().current
    }

    pub fn sync(&self) -> SkyCoordinate {
        self.state.lock().sync
    }

    pub fn is_goto_in_progress(&self) -> bool {
        self.state.lock().goto_in_progress
    }

    pub fn snapshot(&self) -> MountState {
        *self.state.lock()
    }

    /// Declare the pointing without moving
    pub fn set_sync(&self, target: SkyCoordinate) {
        let mut state = self.state.lock();
        state.sync = target;
        state.current = target;
        tracing::info!("Synced to {}", target);
    }

    // =========================================================================
    // Motion
    // =========================================================================

    /// Absolute move of both axes to `target`
    ///
    /// Each axis takes the shorter way round. Blocks until both axes stop and
    /// returns the position reached, which is short of `target` when the goto
    /// was cancelled.
    pub fn goto(&self, target: SkyCoordinate, speed: u16) -> Result<SkyCoordinate> {
        if !target.is_finite() {
            return Err(MountError::InvalidTarget(format!("{}", target)));
        }

        let _motion = self.motion.lock();
        self.cancel.store(false, Ordering::Release);
        let (_guard, start) = GotoGuard::start(&self.state);

        let delta_h = shortest_delta(start.current.horizontal(), target.horizontal());
        let delta_v = shortest_delta(start.current.vertical(), target.vertical());
        let sign_h = Self::horizontal_sign(start.tracking_mode);

        tracing::info!(
            "Goto {} -> {} (Δh {:+.4}°, Δv {:+.4}°)",
            start.current,
            target,
            delta_h,
            delta_v
        );

        let (report_h, report_v) = self.drive_axes(delta_h * sign_h, delta_v, speed)?;

        let reached = if report_h.cancelled || report_v.cancelled {
            SkyCoordinate::new(
                start.current.horizontal() + report_h.degrees_moved * sign_h,
                start.current.vertical() + report_v.degrees_moved,
            )
        } else {
            target
        };

        {
            let mut state = self.state.lock();
            state.current = reached;
            state.goto_in_progress = false;
        }

        tracing::info!("Goto finished at {}", reached);
        Ok(reached)
    }

    /// Relative move of one axis, added to the current position
    pub fn slew(&self, axis: Axis, delta: f64, speed: u16) -> Result<SkyCoordinate> {
        if !delta.is_finite() {
            return Err(MountError::InvalidTarget(format!("slew by {}", delta)));
        }

        let _motion = self.motion.lock();
        self.cancel.store(false, Ordering::Release);
        let (_guard, start) = GotoGuard::start(&self.state);

        tracing::info!("Slew {:?} by {:+.4}°", axis, delta);

        let report = match axis {
            Axis::Horizontal => {
                let sign = Self::horizontal_sign(start.tracking_mode);
                let mut report = self
                    .motor_h
                    .lock()
                    .move_degrees(delta * sign, speed, &self.cancel);
                report.degrees_moved *= sign;
                report
            }
            Axis::Vertical => self.motor_v.lock().move_degrees(delta, speed, &self.cancel),
        };
        let moved = if report.cancelled {
            report.degrees_moved
        } else {
            delta
        };

        let mut state = self.state.lock();
        let current = state.current;
        state.current = match axis {
            Axis::Horizontal => {
                SkyCoordinate::new(current.horizontal() + moved, current.vertical())
            }
            Axis::Vertical => SkyCoordinate::new(current.horizontal(), current.vertical() + moved),
        };
        state.goto_in_progress = false;
        Ok(state.current)
    }

    /// Stop any running move at the next pulse
    pub fn cancel_goto(&self) {
        self.cancel.store(true, Ordering::Release);
        self.state.lock().goto_in_progress = false;
        tracing::info!("Goto cancelled");
    }

    fn horizontal_sign(mode: TrackingMode) -> f64 {
        if mode == TrackingMode::EquatorialSouth {
            -1.0
        } else {
            1.0
        }
    }

    /// Run both axes at once and wait for both
    fn drive_axes(&self, delta_h: f64, delta_v: f64, speed: u16) -> Result<(MoveReport, MoveReport)> {
        let cancel = &self.cancel;

        let joined = crossbeam::thread::scope(|s| {
            let horizontal = s.spawn(|_| self.motor_h.lock().move_degrees(delta_h, speed, cancel));
            let vertical = s.spawn(|_| self.motor_v.lock().move_degrees(delta_v, speed, cancel));
            (horizontal.join(), vertical.join())
        })
        .map_err(|_| MountError::Motion("axis scope panicked".to_string()))?;

        match joined {
            (Ok(h), Ok(v)) => Ok((h, v)),
            _ => Err(MountError::Motion("axis thread panicked".to_string())),
        }
    }

    // =========================================================================
    // Observation & Shutdown
    // =========================================================================

    /// Progress reports of both axes
    ///
    /// Receivers share one queue; each report goes to one of them.
    pub fn subscribe_progress(&self) -> Receiver<MotionProgress> {
        self.progress.clone()
    }

    /// Disable both axes and hand the pins back
    pub fn release(&self) {
        self.cancel_goto();
        let _motion = self.motion.lock();
        self.motor_h.lock().release();
        self.motor_v.lock().release();
    }
}
