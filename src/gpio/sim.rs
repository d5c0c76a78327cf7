//! Simulated GPIO
//!
//! Records pin levels and step edges instead of touching hardware.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{MountError, Result};
use super::{Level, PinBackend, PinMode};

#[derive(Debug, Default)]
struct SimState {
    modes: HashMap<String, PinMode>,
    levels: HashMap<String, Level>,
    rising_edges: HashMap<String, u64>,
    writes: u64,
    cleanups: u32,
}

/// In-memory pin backend
pub struct SimulatedGpio {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Observer handle sharing this backend's state
    pub fn probe(&self) -> SimProbe {
        SimProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for SimulatedGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl PinBackend for SimulatedGpio {
    fn name(&self) -> &'static str {
        "simulator"
    }

    fn setup(&mut self, pin: &str, mode: PinMode) -> Result<()> {
        if pin.is_empty() {
            return Err(MountError::Hardware("Empty pin name".to_string()));
        }
        let mut state = self.state.lock();
        state.modes.insert(pin.to_string(), mode);
        state.levels.entry(pin.to_string()).or_insert(Level::Low);
        Ok(())
    }

    fn output(&mut self, pin: &str, level: Level) {
        let mut state = self.state.lock();
        if !state.modes.contains_key(pin) {
            tracing::warn!("Simulator: write to pin {} before setup", pin);
        }

        let previous = state.levels.insert(pin.to_string(), level);
        if level.is_high() && previous != Some(Level::High) {
            *state.rising_edges.entry(pin.to_string()).or_insert(0) += 1;
        }
        state.writes += 1;
    }

    fn cleanup(&mut self) {
        let mut state = self.state.lock();
        state.modes.clear();
        state.cleanups += 1;
    }
}

/// Read-only view of a `SimulatedGpio`
#[derive(Clone)]
pub struct SimProbe {
    state: Arc<Mutex<SimState>>,
}

impl SimProbe {
    /// Current level of a pin (Low if never written)
    pub fn level(&self, pin: &str) -> Level {
        self.state
            .lock()
            .levels
            .get(pin)
            .copied()
            .unwrap_or(Level::Low)
    }

    /// Low→High transitions seen on a pin
    pub fn rising_edges(&self, pin: &str) -> u64 {
        self.state.lock().rising_edges.get(pin).copied().unwrap_or(0)
    }

    pub fn is_setup(&self, pin: &str) -> bool {
        self.state.lock().modes.contains_key(pin)
    }

    /// Total `output` calls
    pub fn writes(&self) -> u64 {
        self.state.lock().writes
    }

    pub fn cleanups(&self) -> u32 {
        self.state.lock().cleanups
    }

    /// Forget recorded edges, keeping levels
    pub fn reset_edges(&self) {
        self.state.lock().rising_edges.clear();
    }
}
