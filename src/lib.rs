//! # AstroPi
//!
//! Telescope mount controller for single-board computers:
//! - NexStar (and minimal LX200) hand-controller protocol over TCP
//! - Hex angle codec for 16- and 32-bit angle fields
//! - Two stepper axes driven concurrently, with cancellable gotos
//! - Sysfs GPIO or an in-memory simulator as the pin backend
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │              (thread per planetarium client)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Protocol Engine (NexStar / LX200)              │
//! │             decode ─► Command ─► Response                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Mount Coordinator                         │
//! │        (state mutex, motion lock, cancel flag)              │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │  Motor (RA/Az)  │                │ Motor (Dec/Alt) │
//!   └────────┬────────┘                └────────┬────────┘
//!            ▼                                  ▼
//!   ┌─────────────────────────────────────────────────────┐
//!   │            PinBackend (sysfs / simulator)           │
//!   └─────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod coords;
pub mod gpio;
pub mod motor;
pub mod mount;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use coords::SkyCoordinate;
pub use error::{MountError, Result};
pub use mount::MountCoordinator;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of AstroPi
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
