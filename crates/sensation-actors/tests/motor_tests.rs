//! Timing behaviour of the vibration motor against a recording driver.
//!
//! All tests run on a paused clock, so sleeps complete instantly and the
//! recorded write times are deterministic.

use std::sync::Arc;
use std::time::Duration;

use sensation_actors::prelude::*;
use sensation_test_helpers::prelude::*;
use tokio::time::sleep;

const TOLERANCE: Duration = Duration::from_millis(5);
const VALUE_TOLERANCE: f32 = 0.001;

fn motor_with(driver: &Arc<MockPwmDriver>, params: MotorParams) -> VibrationMotor {
    VibrationMotor::new(driver.clone(), 0, params)
}

fn motor(driver: &Arc<MockPwmDriver>) -> VibrationMotor {
    motor_with(driver, MotorParams::default())
}

fn mapped(intensity: f32) -> f32 {
    MotorParams::default().map_intensity(intensity)
}

#[track_caller]
fn assert_write(write: Option<&PwmWrite>, at: Duration, intensity: f32) {
    let write = must_some(write, "expected a driver write");
    let skew = if write.at > at { write.at - at } else { at - write.at };
    assert!(skew <= TOLERANCE, "write at {:?}, expected {:?}", write.at, at);
    assert!(
        (write.intensity() - intensity).abs() <= VALUE_TOLERANCE,
        "wrote {}, expected {}",
        write.intensity(),
        intensity
    );
}

async fn settle() {
    sleep(Duration::from_secs(3)).await;
}

#[tokio::test(start_paused = true)]
async fn direct_set_writes_once() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(1.0, 100));
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].off_tick, 4095);
    assert_eq!(writes[0].on_tick, 0);
}

#[tokio::test(start_paused = true)]
async fn minimal_change_is_ignored() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.5, 100));
    sleep(Duration::from_millis(100)).await;
    must(motor.set_intensity(0.5001, 100));
    settle().await;

    assert_eq!(driver.writes().len(), 1);
    assert!((motor.intensity() - 0.5001).abs() < f32::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn low_value_needs_warmup() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.1, 100));
    assert!(motor.is_warming());
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 2);
    assert_write(writes.first(), Duration::ZERO, 0.5);
    assert_write(writes.get(1), Duration::from_millis(200), mapped(0.1));
    assert!(!motor.is_warming());
}

#[tokio::test(start_paused = true)]
async fn update_during_warmup_supersedes_target() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.1, 100));
    sleep(Duration::from_millis(100)).await;
    must(motor.set_intensity(0.2, 100));
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 2);
    assert_write(writes.get(1), Duration::from_millis(200), mapped(0.2));
}

#[tokio::test(start_paused = true)]
async fn repeated_updates_never_stack_timers() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    for intensity in [0.1, 0.12, 0.15, 0.11] {
        must(motor.set_intensity(intensity, 100));
        sleep(Duration::from_millis(30)).await;
    }
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 2);
    assert_write(writes.get(1), Duration::from_millis(200), mapped(0.11));
}

#[tokio::test(start_paused = true)]
async fn warmup_time_accumulates() {
    let driver = MockPwmDriver::new().shared();
    let params = MotorParams {
        warmup: Duration::from_secs(1),
        ..MotorParams::default()
    };
    let motor = motor_with(&driver, params);

    must(motor.set_intensity(0.1, 100));
    sleep(Duration::from_millis(700)).await;
    must(motor.set_intensity(0.15, 100));
    sleep(Duration::from_millis(500)).await;
    must(motor.set_intensity(0.2, 100));
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 3);
    assert_write(writes.get(1), Duration::from_secs(1), mapped(0.15));
    assert_write(writes.get(2), Duration::from_millis(1200), mapped(0.2));
}

#[tokio::test(start_paused = true)]
async fn warmed_motor_drops_to_minimum_instantly() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(1.0, 100));
    sleep(Duration::from_millis(300)).await;
    must(motor.set_intensity(0.1, 100));
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 2);
    assert_write(writes.get(1), Duration::from_millis(300), mapped(0.1));
}

#[tokio::test(start_paused = true)]
async fn running_motor_finishes_warmup_before_minimum() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(1.0, 100));
    sleep(Duration::from_millis(100)).await;
    must(motor.set_intensity(0.1, 100));
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 2);
    assert_write(writes.first(), Duration::ZERO, 1.0);
    assert_write(writes.get(1), Duration::from_millis(200), mapped(0.1));
}

#[tokio::test(start_paused = true)]
async fn high_value_during_warmup_applies_instantly() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.1, 100));
    sleep(Duration::from_millis(100)).await;
    must(motor.set_intensity(1.0, 100));
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 2);
    assert_write(writes.get(1), Duration::from_millis(100), 1.0);
}

#[tokio::test(start_paused = true)]
async fn turning_off_during_warmup_applies_instantly() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.1, 100));
    sleep(Duration::from_millis(100)).await;
    must(motor.set_intensity(0.0, 100));
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 2);
    assert_write(writes.get(1), Duration::from_millis(100), 0.0);
    assert_eq!(motor.running_for(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn lower_priority_does_not_override() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.5, 100));
    sleep(Duration::from_millis(500)).await;
    must(motor.set_intensity(0.8, 50));
    settle().await;

    assert_eq!(driver.writes().len(), 1);
    assert!((motor.intensity() - 0.5).abs() < f32::EPSILON);
    assert_eq!(motor.top_priority(), 100);
}

#[tokio::test(start_paused = true)]
async fn higher_priority_overrides() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.5, 100));
    sleep(Duration::from_millis(500)).await;
    must(motor.set_intensity(0.8, 150));
    settle().await;

    assert_eq!(driver.writes().len(), 2);
    assert!((motor.intensity() - 0.8).abs() < f32::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn withdrawing_high_priority_falls_back() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.6, 100));
    must(motor.set_intensity(1.0, 200));
    must(motor.set_intensity(0.0, 200));
    settle().await;

    let last = driver.last_write();
    assert_write(last.as_ref(), Duration::ZERO, mapped(0.6));
}

#[tokio::test(start_paused = true)]
async fn out_of_range_intensity_is_rejected() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    assert!(matches!(
        motor.set_intensity(1.5, 100),
        Err(ActorError::InvalidIntensity(_))
    ));
    assert!(matches!(
        motor.set_intensity(f32::NAN, 100),
        Err(ActorError::InvalidIntensity(_))
    ));
    assert!(matches!(
        motor.set_intensity(-0.1, 100),
        Err(ActorError::InvalidIntensity(_))
    ));
    assert!(driver.writes().is_empty());
    assert_eq!(motor.top_priority(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_write_keeps_attempted_output() {
    let driver = MockPwmDriver::with_failure().shared();
    let motor = motor(&driver);

    let result = motor.set_intensity(1.0, 100);
    assert!(matches!(result, Err(ActorError::Driver(_))));
    assert!((motor.current_output() - 1.0).abs() < f32::EPSILON);

    // same value again is not a change, the next real change is attempted
    assert!(motor.set_intensity(1.0, 100).is_ok());
    assert!(motor.set_intensity(0.0, 100).is_err());
    assert_eq!(driver.writes().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn reset_switches_off_and_cancels_warmup() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    must(motor.set_intensity(0.1, 100));
    must(motor.reset());
    settle().await;

    let writes = driver.writes();
    assert_eq!(writes.len(), 2);
    assert_write(writes.get(1), Duration::ZERO, 0.0);
    assert!(!motor.is_warming());
    assert!(motor.intensity().abs() < f32::EPSILON);
}

#[test]
fn warmup_outside_runtime_is_reported() {
    let driver = MockPwmDriver::new().shared();
    let motor = motor(&driver);

    assert!(matches!(
        motor.set_intensity(0.1, 100),
        Err(ActorError::NoRuntime)
    ));
    assert!(driver.writes().is_empty());

    // direct writes need no runtime
    must(motor.set_intensity(1.0, 100));
    assert_eq!(driver.writes().len(), 1);
}
