//! Motor Driver Tests
//!
//! Step generation against the simulated pin backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use astropi::gpio::{Level, SimProbe, SimulatedGpio};
use astropi::motor::{
    microstep_pattern, AxisPins, MotorDriver, MotorProfile, StepSequence, StepTiming,
    PROGRESS_INTERVAL,
};
use astropi::MountError;
use crossbeam::channel;

fn step_dir_pins() -> AxisPins {
    AxisPins::step_dir("STEP", "DIR", Some("EN"), &["MS1", "MS2", "MS3"])
}

fn coil_pins() -> AxisPins {
    AxisPins::coils(["IN1", "IN2", "IN3", "IN4"])
}

fn driver_with(pins: AxisPins, timing: StepTiming) -> (MotorDriver, SimProbe) {
    let gpio = SimulatedGpio::new();
    let probe = gpio.probe();
    let driver = MotorDriver::new("Test", MotorProfile::NEMA17, pins, Box::new(gpio))
        .unwrap()
        .with_timing(timing);
    (driver, probe)
}

fn fast_driver(pins: AxisPins) -> (MotorDriver, SimProbe) {
    driver_with(pins, StepTiming::from_millis(0, 0))
}

fn no_cancel() -> AtomicBool {
    AtomicBool::new(false)
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_new_leaves_axis_disabled() {
    let (driver, probe) = fast_driver(step_dir_pins());

    for pin in ["STEP", "DIR", "EN", "MS1", "MS2", "MS3"] {
        assert!(probe.is_setup(pin), "{} not set up", pin);
    }
    assert_eq!(probe.level("STEP"), Level::Low);
    assert_eq!(probe.level("DIR"), Level::Low);
    assert_eq!(probe.level("EN"), Level::High);
    assert!(!driver.is_active());
}

#[test]
fn test_new_selects_sixteenth_microstep() {
    let (driver, probe) = fast_driver(step_dir_pins());

    assert_eq!(driver.microstep(), 16);
    for pin in ["MS1", "MS2", "MS3"] {
        assert_eq!(probe.level(pin), Level::High);
    }
}

#[test]
fn test_new_without_microstep_lines() {
    let pins = AxisPins::step_dir("STEP", "DIR", None, &[]);
    let (driver, _probe) = fast_driver(pins);

    assert_eq!(driver.microstep(), 1);
    assert_eq!(driver.steps_per_revolution(), 200.0);
}

#[test]
fn test_coil_driver_defaults_to_half_step() {
    let gpio = SimulatedGpio::new();
    let driver =
        MotorDriver::new("Coils", MotorProfile::BYJ_28, coil_pins(), Box::new(gpio)).unwrap();

    assert_eq!(driver.sequence(), StepSequence::Half);
    assert_eq!(driver.timing(), StepSequence::Half.timing());
}

#[test]
fn test_step_dir_default_timing() {
    let gpio = SimulatedGpio::new();
    let driver =
        MotorDriver::new("Axis", MotorProfile::NEMA17, step_dir_pins(), Box::new(gpio)).unwrap();

    assert_eq!(driver.timing(), StepTiming::STEP_DIR);
}

// =============================================================================
// Microstepping
// =============================================================================

#[test]
fn test_set_microstep_patterns() {
    let (mut driver, probe) = fast_driver(step_dir_pins());

    for divisor in [1u8, 2, 4, 8, 16] {
        driver.set_microstep(divisor).unwrap();
        let expected = microstep_pattern(divisor).unwrap();
        let actual = [
            probe.level("MS1").is_high(),
            probe.level("MS2").is_high(),
            probe.level("MS3").is_high(),
        ];
        assert_eq!(actual, expected, "divisor {}", divisor);
        assert_eq!(driver.microstep(), divisor);
    }

    assert_eq!(microstep_pattern(2), Some([true, false, false]));
    assert_eq!(microstep_pattern(8), Some([true, true, false]));
}

#[test]
fn test_set_microstep_rejects_unsupported_divisor() {
    let (mut driver, _probe) = fast_driver(step_dir_pins());

    let result = driver.set_microstep(3);
    assert!(matches!(result, Err(MountError::InvalidMicrostep(3))));
    assert_eq!(driver.microstep(), 16);
}

#[test]
fn test_set_microstep_without_lines_fails() {
    let (mut driver, _probe) = fast_driver(AxisPins::step_dir("STEP", "DIR", None, &[]));

    assert!(matches!(driver.set_microstep(4), Err(MountError::Hardware(_))));
    assert_eq!(driver.microstep(), 1);
}

// =============================================================================
// Step/Dir Moves
// =============================================================================

#[test]
fn test_half_turn_pulse_count() {
    let (mut driver, probe) = fast_driver(step_dir_pins());

    let report = driver.move_degrees(180.0, 200, &no_cancel());

    // 200 steps/rev × 1/16 microstep
    assert_eq!(probe.rising_edges("STEP"), 1600);
    assert_eq!(report.requested_steps, 1600);
    assert_eq!(report.completed_steps, 1600);
    assert!(!report.cancelled);
    assert!((report.degrees_moved - 180.0).abs() < 1e-9);
    assert_eq!(probe.level("STEP"), Level::Low);
}

#[test]
fn test_direction_follows_sign() {
    let (mut driver, probe) = fast_driver(step_dir_pins());

    driver.move_degrees(10.0, 50, &no_cancel());
    assert_eq!(probe.level("DIR"), Level::High);

    let report = driver.move_degrees(-10.0, 50, &no_cancel());
    assert_eq!(probe.level("DIR"), Level::Low);
    assert!(report.completed_steps < 0);
    assert!((report.degrees_moved + 10.0).abs() < 0.2);
}

#[test]
fn test_enable_toggles_around_move() {
    let (mut driver, probe) = fast_driver(step_dir_pins());
    assert_eq!(probe.rising_edges("EN"), 1);

    driver.move_steps(10, 100, &no_cancel());

    // Low while stepping, back High afterwards
    assert_eq!(probe.rising_edges("EN"), 2);
    assert_eq!(probe.level("EN"), Level::High);
    assert!(!driver.is_active());
}

#[test]
fn test_zero_move_is_noop() {
    let (mut driver, probe) = fast_driver(step_dir_pins());
    let writes = probe.writes();

    let report = driver.move_degrees(0.0, 100, &no_cancel());

    assert_eq!(report.requested_steps, 0);
    assert_eq!(report.completed_steps, 0);
    assert_eq!(probe.writes(), writes);
}

#[test]
fn test_speed_is_clamped_to_profile() {
    let (mut driver, probe) = fast_driver(step_dir_pins());

    let report = driver.move_degrees(1.0, u16::MAX, &no_cancel());
    assert!(!report.cancelled);
    assert_eq!(probe.rising_edges("STEP"), report.completed_steps as u64);

    let report = driver.move_degrees(1.0, 0, &no_cancel());
    assert!(!report.cancelled);
}

// =============================================================================
// Coil Moves
// =============================================================================

#[test]
fn test_half_step_phase_progression() {
    let (mut driver, probe) = fast_driver(coil_pins());
    driver.set_sequence(StepSequence::Half).unwrap();

    // Phase 0 -> 1 energizes IN1+IN2
    driver.move_steps(1, 100, &no_cancel());
    assert_eq!(probe.rising_edges("IN1"), 1);
    assert_eq!(probe.rising_edges("IN2"), 1);
    assert_eq!(probe.rising_edges("IN3"), 0);
    assert_eq!(probe.rising_edges("IN4"), 0);

    // Coils are released after the move
    for pin in ["IN1", "IN2", "IN3", "IN4"] {
        assert_eq!(probe.level(pin), Level::Low);
    }

    // Back to phase 0: IN1 alone
    driver.move_steps(-1, 100, &no_cancel());
    assert_eq!(probe.rising_edges("IN1"), 2);
    assert_eq!(probe.rising_edges("IN2"), 1);
}

#[test]
fn test_wave_sequence_energizes_each_coil_once() {
    let (mut driver, probe) = fast_driver(coil_pins());
    driver.set_sequence(StepSequence::Wave).unwrap();

    driver.move_steps(4, 100, &no_cancel());

    for pin in ["IN1", "IN2", "IN3", "IN4"] {
        assert_eq!(probe.rising_edges(pin), 1, "{}", pin);
    }
}

#[test]
fn test_sequence_tables() {
    assert_eq!(StepSequence::Wave.pattern().len(), 4);
    assert_eq!(StepSequence::Full.pattern().len(), 4);
    assert_eq!(StepSequence::Half.pattern().len(), 8);
    assert_eq!(StepSequence::Full.pattern()[0], [true, true, false, false]);
    assert_eq!(StepSequence::Half.pattern()[7], [true, false, false, true]);

    assert_eq!(StepSequence::Wave.timing(), StepTiming::from_millis(5, 20));
    assert_eq!(StepSequence::Full.timing(), StepTiming::from_millis(4, 15));
    assert_eq!("FULL".parse::<StepSequence>().unwrap(), StepSequence::Full);
    assert!("quarter".parse::<StepSequence>().is_err());
}

#[test]
fn test_set_sequence_on_step_dir_fails() {
    let (mut driver, _probe) = fast_driver(step_dir_pins());
    assert!(driver.set_sequence(StepSequence::Full).is_err());
}

#[test]
fn test_pinned_timing_survives_sequence_change() {
    let timing = StepTiming::from_millis(0, 0);
    let (mut driver, _probe) = driver_with(coil_pins(), timing);

    driver.set_sequence(StepSequence::Wave).unwrap();
    assert_eq!(driver.timing(), timing);
}

// =============================================================================
// Timing
// =============================================================================

#[test]
fn test_delay_interpolation() {
    let timing = StepTiming::from_millis(1, 20);
    let close = |a: Duration, b: Duration| {
        let diff = if a > b { a - b } else { b - a };
        diff < Duration::from_micros(1)
    };

    assert!(close(timing.delay_for(1, 200), Duration::from_millis(20)));
    assert!(close(timing.delay_for(200, 200), Duration::from_millis(1)));
    assert!(close(timing.delay_for(0, 200), Duration::from_millis(20)));
    assert!(close(timing.delay_for(1000, 200), Duration::from_millis(1)));
    assert!(timing.delay_for(100, 200) < timing.delay_for(50, 200));
    assert_eq!(timing.delay_for(7, 1), Duration::from_millis(20));
}

#[test]
fn test_motor_profiles() {
    assert_eq!(MotorProfile::NEMA17.steps_per_revolution(), 200.0);
    assert!((MotorProfile::BYJ_28.steps_per_revolution() - 4075.7728).abs() < 1e-6);
    assert_eq!(MotorProfile::NEMA17.steps_for_degrees(90.0), 50);
    assert!((MotorProfile::NEMA17.degrees_for_steps(50) - 90.0).abs() < 1e-9);
    assert_eq!(MotorProfile::by_key("nema17"), Some(MotorProfile::NEMA17));
    assert_eq!(MotorProfile::by_key("28byj-48"), Some(MotorProfile::BYJ_28));
    assert_eq!(MotorProfile::by_key("unknown"), None);
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_cancel_before_move() {
    let (mut driver, probe) = fast_driver(step_dir_pins());
    let cancel = AtomicBool::new(true);

    let report = driver.move_steps(500, 100, &cancel);

    assert!(report.cancelled);
    assert_eq!(report.completed_steps, 0);
    assert_eq!(probe.rising_edges("STEP"), 0);
    assert_eq!(probe.level("EN"), Level::High);
}

#[test]
fn test_cancel_mid_move_stops_early() {
    let (mut driver, probe) = driver_with(step_dir_pins(), StepTiming::from_millis(1, 1));
    let cancel = Arc::new(AtomicBool::new(false));

    let trigger = {
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            cancel.store(true, Ordering::Release);
        })
    };

    let report = driver.move_steps(10_000, 100, &cancel);
    trigger.join().unwrap();

    assert!(report.cancelled);
    assert!(report.completed_steps > 0);
    assert!(report.completed_steps < 10_000);
    assert_eq!(probe.rising_edges("STEP"), report.completed_steps as u64);
    assert!(report.elapsed < Duration::from_secs(5));
    assert!(!driver.is_active());
}

// =============================================================================
// Progress
// =============================================================================

#[test]
fn test_progress_is_rate_bounded() {
    let (mut driver, _probe) = driver_with(step_dir_pins(), StepTiming::from_millis(1, 1));
    let (sink, reports) = channel::bounded(64);
    driver.set_progress_sink(sink);

    driver.move_steps(1200, 100, &no_cancel());
    let reports: Vec<_> = reports.try_iter().collect();

    // At least one interim report plus the final one, never one per step
    assert!(reports.len() >= 2, "got {} reports", reports.len());
    assert!(reports.len() < 20, "got {} reports", reports.len());

    let last = reports.last().unwrap();
    assert!(last.is_finished());
    assert_eq!(last.total, 1200);
    assert_eq!(last.axis, "Test");

    let interim = &reports[..reports.len() - 1];
    for pair in interim.windows(2) {
        assert!(pair[1].elapsed - pair[0].elapsed >= PROGRESS_INTERVAL);
    }
    assert!(interim[0].elapsed >= PROGRESS_INTERVAL);
}

#[test]
fn test_progress_percent() {
    let (mut driver, _probe) = fast_driver(step_dir_pins());
    let (sink, reports) = channel::bounded(8);
    driver.set_progress_sink(sink);

    driver.move_steps(-40, 100, &no_cancel());

    let last = reports.try_iter().last().unwrap();
    assert_eq!(last.completed, 40);
    assert_eq!(last.percent(), 100.0);
}

// =============================================================================
// Release
// =============================================================================

#[test]
fn test_release_is_idempotent() {
    let (mut driver, probe) = fast_driver(step_dir_pins());

    driver.release();
    driver.release();
    assert_eq!(probe.cleanups(), 1);
    assert!(driver.is_released());

    // Moves after release do nothing
    let report = driver.move_steps(100, 100, &no_cancel());
    assert_eq!(report.completed_steps, 0);
    assert_eq!(probe.rising_edges("STEP"), 0);

    drop(driver);
    assert_eq!(probe.cleanups(), 1);
}

#[test]
fn test_drop_releases_pins() {
    let (driver, probe) = fast_driver(step_dir_pins());
    drop(driver);

    assert_eq!(probe.cleanups(), 1);
    assert!(!probe.is_setup("STEP"));
}
