//! Protocol Module
//!
//! Hand-controller protocols spoken to planetarium clients.
//!
//! ## NexStar (binary, one command per frame)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Cmd (1)  │   Payload (0-17 bytes)      │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! ### Response Format
//! ```text
//! ┌─────────────────────────────┬─────┐
//! │   Payload (may be empty)    │  #  │
//! └─────────────────────────────┴─────┘
//! ```
//!
//! Malformed or unknown commands are answered with a bare `#`; the
//! connection stays open.
//!
//! ## LX200 (text, `:XX#` commands, several per frame)
//!
//! See `lx200` for the supported subset.

mod clock;
mod codec;
mod command;
mod lx200;
mod nexstar;
mod response;

use std::sync::Arc;

use crate::config::ProtocolVariant;
use crate::mount::MountCoordinator;

pub use clock::{ClockReading, CLOCK_BYTES, CLOCK_SKEW_TOLERANCE};
pub use codec::{decode_angle_pair, decode_command, encode_angle_pair, encode_command, PASS_THROUGH_LEN};
pub use command::{device, message, Command, CommandType, PassThrough};
pub use lx200::{format_dec, format_ra, parse_dec, parse_ra, Lx200Engine};
pub use nexstar::{NexStarEngine, APP_VERSION, DEVICE_VERSION, GPS_VERSION, NUDGE_DEGREES_PER_RATE};
pub use response::{Response, TERMINATOR};

/// Per-connection protocol state machine
pub trait ProtocolHandler: Send {
    /// Protocol name for logs
    fn name(&self) -> &'static str;

    /// Bytes read per frame
    fn recv_buffer_size(&self) -> usize;

    /// Reply to one frame; an empty reply sends nothing
    fn handle_frame(&mut self, frame: &[u8]) -> Response;
}

/// Fresh handler for a new connection
pub fn handler_for(
    variant: ProtocolVariant,
    mount: Arc<MountCoordinator>,
    goto_speed: u16,
) -> Box<dyn ProtocolHandler> {
    match variant {
        ProtocolVariant::NexStar => Box::new(NexStarEngine::new(mount, goto_speed)),
        ProtocolVariant::Lx200 => Box::new(Lx200Engine::new(mount, goto_speed)),
    }
}
