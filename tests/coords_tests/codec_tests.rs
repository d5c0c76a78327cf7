//! Angle Codec Tests
//!
//! Tests for degree <-> hex field conversion.

use astropi::coords::{degrees_to_hex, hex_to_degrees, Precision};
use astropi::MountError;

// =============================================================================
// Standard (16-bit) Fields
// =============================================================================

#[test]
fn test_standard_decode_vectors() {
    let cases = [
        ("12CE", 26.4441),
        ("34AB", 74.0643),
        ("0000", 0.0),
        ("8000", 180.0),
        ("FFFF", 359.9945),
        ("C000", 270.0),
    ];

    for (hex, degrees) in cases {
        assert_eq!(hex_to_degrees(hex, Precision::Standard).unwrap(), degrees, "{}", hex);
    }
}

#[test]
fn test_standard_encode_vectors() {
    let cases = [
        (26.4441, "12CE"),
        (74.0643, "34AB"),
        (0.0, "0000"),
        (180.0, "8000"),
        (359.9945, "FFFF"),
        (270.0, "C000"),
    ];

    for (degrees, hex) in cases {
        assert_eq!(degrees_to_hex(degrees, Precision::Standard), hex, "{}", degrees);
    }
}

#[test]
fn test_standard_encode_wraps_out_of_range() {
    assert_eq!(degrees_to_hex(360.0, Precision::Standard), "0000");
    assert_eq!(degrees_to_hex(-90.0, Precision::Standard), "C000");
    assert_eq!(degrees_to_hex(720.0 + 180.0, Precision::Standard), "8000");
}

#[test]
fn test_standard_lowercase_accepted() {
    assert_eq!(hex_to_degrees("12ce", Precision::Standard).unwrap(), 26.4441);
}

// =============================================================================
// Precise (32-bit) Fields
// =============================================================================

#[test]
fn test_precise_decode_vectors() {
    let cases = [
        ("1B0D70A6", 38.04257831),
        ("3F791F6B", 89.25909701),
        ("1B0D7000", 38.04256439),
        ("3F791F00", 89.25908804),
        ("00000000", 0.0),
        ("80000000", 180.0),
        ("FFFFFFFF", 359.99999992),
        ("E4F29000", 321.95743561),
        ("55555555", 119.99999997),
    ];

    for (hex, degrees) in cases {
        assert_eq!(hex_to_degrees(hex, Precision::Precise).unwrap(), degrees, "{}", hex);
    }
}

#[test]
fn test_precise_encode_vectors() {
    let cases = [
        (38.04257831, "1B0D70A6"),
        (89.25909701, "3F791F6B"),
        (38.04256439, "1B0D7000"),
        (89.25908804, "3F791F00"),
        (0.0, "00000000"),
        (180.0, "80000000"),
        (359.99999992, "FFFFFFFF"),
    ];

    for (degrees, hex) in cases {
        assert_eq!(degrees_to_hex(degrees, Precision::Precise), hex, "{}", degrees);
    }
}

#[test]
fn test_precise_encode_wraps_out_of_range() {
    assert_eq!(degrees_to_hex(360.0, Precision::Precise), "00000000");
    assert_eq!(degrees_to_hex(-38.04256439, Precision::Precise), "E4F29000");
    assert_eq!(degrees_to_hex(480.0, Precision::Precise), "55555555");
}

#[test]
fn test_encoded_width_is_fixed() {
    for degrees in [0.0, 0.001, 1.0, 90.0, 359.0] {
        assert_eq!(degrees_to_hex(degrees, Precision::Standard).len(), 4);
        assert_eq!(degrees_to_hex(degrees, Precision::Precise).len(), 8);
    }
}

// =============================================================================
// Malformed Fields
// =============================================================================

#[test]
fn test_decode_rejects_wrong_length() {
    for hex in ["", "12C", "12CE0", "1B0D70A6"] {
        let result = hex_to_degrees(hex, Precision::Standard);
        assert!(matches!(result, Err(MountError::Decode(_))), "{}", hex);
    }
    assert!(hex_to_degrees("12CE", Precision::Precise).is_err());
}

#[test]
fn test_decode_rejects_non_hex() {
    for hex in ["12CG", "+12C", "-12C", "12 E", "ÿÿ"] {
        assert!(hex_to_degrees(hex, Precision::Standard).is_err(), "{}", hex);
    }
}
