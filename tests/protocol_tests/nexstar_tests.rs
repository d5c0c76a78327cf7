//! NexStar Engine Tests
//!
//! Frames in, reply bytes out, over a simulated mount.

use std::sync::Arc;

use astropi::config::ProtocolVariant;
use astropi::coords::{Location, SkyCoordinate};
use astropi::gpio::SimulatedGpio;
use astropi::motor::{AxisPins, MotorDriver, MotorProfile, StepTiming};
use astropi::mount::{MountCoordinator, MountProfile, TrackingMode};
use astropi::protocol::{device, handler_for, message, ClockReading, NexStarEngine};
use chrono::Utc;

fn sim_motor(label: &str) -> MotorDriver {
    let pins = AxisPins::step_dir("STEP", "DIR", Some("EN"), &["MS1", "MS2", "MS3"]);
    MotorDriver::new(label, MotorProfile::NEMA17, pins, Box::new(SimulatedGpio::new()))
        .unwrap()
        .with_timing(StepTiming::from_millis(0, 0))
}

fn mount_for(profile: MountProfile) -> Arc<MountCoordinator> {
    let location = Location::from_lat_long(58, 0, 54, 56, 16, 28);
    Arc::new(MountCoordinator::new(
        profile,
        sim_motor("Ra"),
        sim_motor("Dec"),
        location,
    ))
}

fn engine() -> (NexStarEngine, Arc<MountCoordinator>) {
    let mount = mount_for(MountProfile::ASTRO_PI);
    (NexStarEngine::new(Arc::clone(&mount), 10), mount)
}

fn reply(engine: &mut NexStarEngine, frame: &[u8]) -> Vec<u8> {
    engine.handle_frame(frame).as_bytes().to_vec()
}

// =============================================================================
// Framing
// =============================================================================

#[test]
fn test_echo() {
    let (mut engine, _) = engine();

    assert_eq!(reply(&mut engine, b"Kx"), b"x#");
    assert_eq!(reply(&mut engine, b"K"), b"#");
}

#[test]
fn test_zero_byte_is_echoed_raw() {
    let (mut engine, _) = engine();
    assert_eq!(reply(&mut engine, &[0x00]), vec![0x00]);
}

#[test]
fn test_silent_frames() {
    let (mut engine, _) = engine();

    assert!(reply(&mut engine, b"").is_empty());
    assert!(reply(&mut engine, b"#").is_empty());
}

#[test]
fn test_unknown_and_malformed_frames_answer_terminator() {
    let (mut engine, mount) = engine();

    assert_eq!(reply(&mut engine, b"Q"), b"#");
    assert_eq!(reply(&mut engine, b"R12CE"), b"#");
    assert_eq!(reply(&mut engine, b"r12CE,34AB"), b"#");
    assert_eq!(reply(&mut engine, b"W\x01"), b"#");
    assert_eq!(reply(&mut engine, b"P\x01"), b"#");

    // Nothing moved
    assert_eq!(mount.current(), SkyCoordinate::zero());
}

#[test]
fn test_handler_for_nexstar() {
    let mount = mount_for(MountProfile::ASTRO_PI);
    let mut handler = handler_for(ProtocolVariant::NexStar, mount, 10);

    assert_eq!(handler.name(), "nexstar");
    assert_eq!(handler.recv_buffer_size(), 18);
    assert_eq!(handler.handle_frame(b"V").as_bytes(), &[4, 10, b'#']);
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn test_version_and_model() {
    let (mut engine, _) = engine();

    assert_eq!(reply(&mut engine, b"V"), vec![4, 10, b'#']);
    assert_eq!(reply(&mut engine, b"m"), vec![6, b'#']);
    assert_eq!(reply(&mut engine, b"J"), vec![1, b'#']);
}

#[test]
fn test_model_follows_profile() {
    let mut engine = NexStarEngine::new(mount_for(MountProfile::CGX), 10);
    assert_eq!(reply(&mut engine, b"m"), vec![5, b'#']);
}

// =============================================================================
// Pass-Through
// =============================================================================

#[test]
fn test_gps_linked_follows_profile() {
    let frame = [b'P', 1, device::GPS, message::GPS_LINKED, 0, 0, 0, 1];

    let (mut engine, _) = engine();
    assert_eq!(reply(&mut engine, &frame), vec![0, b'#']);

    let mut engine = NexStarEngine::new(mount_for(MountProfile::SE_5), 10);
    assert_eq!(reply(&mut engine, &frame), vec![1, b'#']);
}

#[test]
fn test_device_versions() {
    let (mut engine, _) = engine();

    let gps = [b'P', 1, device::GPS, message::GET_VERSION, 0, 0, 0, 2];
    let azm = [b'P', 1, device::AZM_RA_MOTOR, message::GET_VERSION, 0, 0, 0, 2];
    let alt = [b'P', 1, device::ALT_DEC_MOTOR, message::GET_VERSION, 0, 0, 0, 2];
    let unknown = [b'P', 1, 42, message::GET_VERSION, 0, 0, 0, 2];

    assert_eq!(reply(&mut engine, &gps), vec![1, 3, b'#']);
    assert_eq!(reply(&mut engine, &azm), vec![1, 0, b'#']);
    assert_eq!(reply(&mut engine, &alt), vec![1, 0, b'#']);
    assert_eq!(reply(&mut engine, &unknown), vec![1, 0, b'#']);
}

#[test]
fn test_rtc_and_other_gps_messages_acknowledged() {
    let (mut engine, _) = engine();

    assert_eq!(reply(&mut engine, &[b'P', 1, device::RTC, 3, 0, 0, 0, 0]), b"#");
    assert_eq!(reply(&mut engine, &[b'P', 1, device::GPS, 1, 0, 0, 0, 3]), b"#");
}

#[test]
fn test_pass_through_slew() {
    let (mut engine, mount) = engine();

    let positive = [b'P', 2, device::AZM_RA_MOTOR, message::MOVE_POSITIVE, 5, 0, 0, 0];
    assert_eq!(reply(&mut engine, &positive), b"#");
    assert_eq!(mount.current().horizontal(), 5.0);

    let negative = [b'P', 2, device::ALT_DEC_MOTOR, message::MOVE_NEGATIVE, 2, 0, 0, 0];
    assert_eq!(reply(&mut engine, &negative), b"#");
    assert_eq!(mount.current().vertical(), -2.0);

    let stop = [b'P', 2, device::AZM_RA_MOTOR, message::MOVE_POSITIVE, 0, 0, 0, 0];
    assert_eq!(reply(&mut engine, &stop), b"#");
    assert!(!mount.is_goto_in_progress());
    assert_eq!(mount.current(), SkyCoordinate::new(5.0, -2.0));
}

// =============================================================================
// Location, Time, Tracking
// =============================================================================

#[test]
fn test_get_and_set_location() {
    let (mut engine, mount) = engine();

    assert_eq!(reply(&mut engine, b"w"), vec![58, 0, 54, 0, 56, 16, 28, 0, b'#']);

    let frame = [b'W', 33, 52, 4, 1, 151, 12, 36, 1];
    assert_eq!(reply(&mut engine, &frame), b"#");
    assert_eq!(reply(&mut engine, b"w"), vec![33, 52, 4, 1, 151, 12, 36, 1, b'#']);
    assert_eq!(engine.location(), mount.location());
    assert!(mount.location().south);
}

#[test]
fn test_get_time_layout() {
    let (mut engine, _) = engine();
    let bytes = reply(&mut engine, b"h");

    assert_eq!(bytes.len(), 9);
    assert_eq!(bytes[8], b'#');

    let reading = ClockReading::from_bytes(&bytes[..8]).unwrap();
    assert!(reading.hour < 24);
    assert!((1..=12).contains(&reading.month));
    assert!((1..=31).contains(&reading.day));
}

#[test]
fn test_set_time_accepted_when_clocks_agree() {
    let (mut engine, _) = engine();

    let mut frame = vec![b'H'];
    frame.extend_from_slice(&ClockReading::from_datetime(&Utc::now()).to_bytes());

    assert_eq!(reply(&mut engine, &frame), b"#");
}

#[test]
fn test_set_time_rejected_when_skewed() {
    let (mut engine, _) = engine();
    let skewed = Utc::now() - chrono::Duration::hours(1);

    let mut frame = vec![b'H'];
    frame.extend_from_slice(&ClockReading::from_datetime(&skewed).to_bytes());

    assert!(reply(&mut engine, &frame).is_empty());
}

#[test]
fn test_set_time_invalid_date_is_silent() {
    let (mut engine, _) = engine();
    let frame = [b'H', 10, 0, 0, 14, 1, 26, 0, 0];

    assert!(reply(&mut engine, &frame).is_empty());
}

#[test]
fn test_tracking_mode() {
    let (mut engine, mount) = engine();

    assert_eq!(reply(&mut engine, b"t"), vec![2, b'#']);

    assert_eq!(reply(&mut engine, b"T\x01"), b"#");
    assert_eq!(reply(&mut engine, b"t"), vec![1, b'#']);
    assert_eq!(mount.tracking_mode(), TrackingMode::AltAz);

    // Unknown modes leave the setting alone
    assert_eq!(reply(&mut engine, b"T\x07"), b"#");
    assert_eq!(mount.tracking_mode(), TrackingMode::AltAz);
}

// =============================================================================
// Positions
// =============================================================================

#[test]
fn test_sync_then_get_ra_dec() {
    let (mut engine, mount) = engine();

    assert_eq!(reply(&mut engine, b"S12CE,34AB"), b"#");
    assert_eq!(reply(&mut engine, b"E"), b"12CE,34AB#");
    assert_eq!(mount.sync(), SkyCoordinate::new(26.4441, 74.0643));
}

#[test]
fn test_precise_sync_then_get() {
    let (mut engine, _) = engine();

    assert_eq!(reply(&mut engine, b"s1B0D70A6,3F791F6B"), b"#");
    assert_eq!(reply(&mut engine, b"e"), b"1B0D70A6,3F791F6B#");
}

#[test]
fn test_negative_declination_reported_as_wrapped_hex() {
    let (mut engine, mount) = engine();

    assert_eq!(reply(&mut engine, b"S4000,C000"), b"#");
    assert_eq!(mount.current().vertical(), -90.0);
    assert_eq!(reply(&mut engine, b"E"), b"4000,C000#");
}

#[test]
fn test_goto_ra_dec_blocks_until_done() {
    let (mut engine, mount) = engine();

    assert_eq!(reply(&mut engine, b"R4000,2000"), b"#");

    assert!(!mount.is_goto_in_progress());
    assert_eq!(mount.current(), SkyCoordinate::new(90.0, 45.0));
    assert_eq!(reply(&mut engine, b"E"), b"4000,2000#");
    assert_eq!(reply(&mut engine, b"L"), vec![0, b'#']);
}

#[test]
fn test_precise_goto() {
    let (mut engine, _) = engine();

    assert_eq!(reply(&mut engine, b"r1B0D7000,3F791F00#"), b"#");
    assert_eq!(reply(&mut engine, b"e"), b"1B0D7000,3F791F00#");
}

#[test]
fn test_az_alt_offset() {
    let (mut engine, mount) = engine();

    // Azimuth 0 maps to the axis half a turn away
    assert_eq!(reply(&mut engine, b"B0000,2000"), b"#");
    assert_eq!(mount.current(), SkyCoordinate::new(180.0, 45.0));

    assert_eq!(reply(&mut engine, b"Z"), b"0000,2000#");
    assert_eq!(reply(&mut engine, b"E"), b"8000,2000#");
}

#[test]
fn test_cancel_when_idle() {
    let (mut engine, mount) = engine();

    assert_eq!(reply(&mut engine, b"M"), b"#");
    assert!(!mount.is_goto_in_progress());
    assert_eq!(reply(&mut engine, b"L"), vec![0, b'#']);
}
