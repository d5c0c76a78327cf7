//! Mount Module
//!
//! Two-axis mount: static descriptors and the coordinator that owns the
//! motors and the pointing state.
//!
//! ## Goto
//! ```text
//!            ┌──────────────── motion lock ────────────────┐
//! goto ─► goto_in_progress=1 ─┬─► motor_h.move_degrees(Δh) ─┬─► current=target
//!                             └─► motor_v.move_degrees(Δv) ─┘   goto_in_progress=0
//! ```
//!
//! Δ is the shortest way round on each axis. Sync declares a position
//! without moving.

mod coordinator;
mod profile;

pub use coordinator::{Axis, MountCoordinator, MountState};
pub use profile::{Model, MountProfile, TrackingMode};
