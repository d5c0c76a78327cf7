//! Coordinates Module
//!
//! Angle representations shared by the protocol and the mount.
//!
//! ## Hex Angle Wheels
//! ```text
//! Standard:  0x0000     .. 0xFFFF      (65536 counts / 360°,  ~19.8")
//! Precise:   0x00000000 .. 0xFFFFFFFF  (2^32 counts / 360°,   ~0.0003")
//! ```

mod codec;
mod location;
mod sky;

pub use codec::{degrees_to_hex, hex_to_degrees, Precision};
pub use location::{Dms, Location, LOCATION_BYTES};
pub use sky::{normalize_degrees, normalize_signed, shortest_delta, SkyCoordinate};
