//! Hex angle codec
//!
//! Converts degrees to and from the fixed-width hexadecimal fields used by
//! the NexStar protocol.

use crate::error::{MountError, Result};
use super::sky::normalize_degrees;

/// Wheel resolution of an angle field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 16-bit wheel, 4 hex digits
    Standard,

    /// 32-bit wheel, 8 hex digits
    Precise,
}

impl Precision {
    /// Counts per full turn
    pub const fn counts(self) -> u64 {
        match self {
            Precision::Standard => 0x1_0000,
            Precision::Precise => 0x1_0000_0000,
        }
    }

    /// Hex digits per field
    pub const fn digits(self) -> usize {
        match self {
            Precision::Standard => 4,
            Precision::Precise => 8,
        }
    }

    /// Decimal places kept when decoding
    const fn decimals(self) -> i32 {
        match self {
            Precision::Standard => 4,
            Precision::Precise => 8,
        }
    }
}

/// Encode degrees (any sign, any magnitude) as a zero-padded uppercase hex field
pub fn degrees_to_hex(degrees: f64, precision: Precision) -> String {
    let counts = precision.counts();
    let scaled = normalize_degrees(degrees) * (counts as f64 / 360.0);

    // 359.99999... can round up to a full turn
    let value = (scaled.round_ties_even() as u64) % counts;

    format!("{:0width$X}", value, width = precision.digits())
}

/// Decode a hex field into degrees in [0, 360)
///
/// The result is rounded to 4 (standard) or 8 (precise) decimal places,
/// which is what clients expect to read back.
pub fn hex_to_degrees(hex: &str, precision: Precision) -> Result<f64> {
    if hex.len() != precision.digits() {
        return Err(MountError::Decode(format!(
            "Angle field '{}': expected {} hex digits, got {}",
            hex,
            precision.digits(),
            hex.len()
        )));
    }

    // from_str_radix would also accept a leading '+'
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(MountError::Decode(format!(
            "Angle field '{}': not hexadecimal",
            hex
        )));
    }

    let value = u64::from_str_radix(hex, 16)
        .map_err(|e| MountError::Decode(format!("Angle field '{}': {}", hex, e)))?;

    let degrees = normalize_degrees(value as f64 * (360.0 / precision.counts() as f64));
    let factor = 10f64.powi(precision.decimals());

    Ok((degrees * factor).round() / factor)
}
