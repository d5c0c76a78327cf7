//! Error types for AstroPi
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using MountError
pub type Result<T> = std::result::Result<T, MountError>;

/// Unified error type for AstroPi operations
#[derive(Debug, Error)]
pub enum MountError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported command: 0x{0:02x}")]
    UnsupportedCommand(u8),

    // -------------------------------------------------------------------------
    // Hardware Errors
    // -------------------------------------------------------------------------
    #[error("Hardware error: {0}")]
    Hardware(String),

    #[error("Unsupported microstep divisor: 1/{0}")]
    InvalidMicrostep(u8),

    // -------------------------------------------------------------------------
    // Motion Errors
    // -------------------------------------------------------------------------
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Motion error: {0}")]
    Motion(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
