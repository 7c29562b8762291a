//! Warmup-aware vibration motor.
//!
//! A motor is in one of three states:
//!
//! - **idle**: output 0, running clock stopped
//! - **warming**: output held at `min_instant_intensity` (or higher) until
//!   the motor has run for `warmup`; a single timer then applies the
//!   latest target
//! - **sustaining**: output at the mapped target, running clock active

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace, warn};

use crate::driver::{PwmDriver, intensity_to_tick};
use crate::error::{ActorError, ActorResult};
use crate::resolver::{PrioritizedIntensity, SENSITIVITY};

/// Physical response parameters of one motor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorParams {
    /// Exponent of the intensity mapping curve.
    pub curve_degree: f32,
    /// Lowest output at which a running motor keeps spinning.
    pub min_intensity: f32,
    /// Lowest output that starts a motor from standstill.
    pub min_instant_intensity: f32,
    /// Run time at `min_instant_intensity` before lower outputs are safe.
    pub warmup: Duration,
}

impl MotorParams {
    /// Default mapping exponent.
    pub const DEFAULT_CURVE_DEGREE: f32 = 1.5;
    /// Default sustain threshold.
    pub const DEFAULT_MIN_INTENSITY: f32 = 0.3;
    /// Default instant-start threshold.
    pub const DEFAULT_MIN_INSTANT_INTENSITY: f32 = 0.5;
    /// Default warmup.
    pub const DEFAULT_WARMUP: Duration = Duration::from_millis(200);

    /// Output for an effective claim `intensity`.
    ///
    /// Anything below [`SENSITIVITY`] maps to exactly 0 so the motor is
    /// really off; everything else lands in `[min_intensity, 1]`.
    pub fn map_intensity(&self, intensity: f32) -> f32 {
        if intensity < SENSITIVITY {
            return 0.0;
        }
        let level = intensity.clamp(0.0, 1.0).powf(self.curve_degree);
        self.min_intensity + (1.0 - self.min_intensity) * level
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::InvalidParameter`] naming the first bad value.
    pub fn validate(&self) -> ActorResult<()> {
        let unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if !(self.curve_degree.is_finite() && self.curve_degree > 0.0) {
            return Err(ActorError::InvalidParameter {
                name: "mapping_curve_degree",
                value: f64::from(self.curve_degree),
            });
        }
        if !unit(self.min_intensity) {
            return Err(ActorError::InvalidParameter {
                name: "min_intensity",
                value: f64::from(self.min_intensity),
            });
        }
        if !unit(self.min_instant_intensity) {
            return Err(ActorError::InvalidParameter {
                name: "min_instant_intensity",
                value: f64::from(self.min_instant_intensity),
            });
        }
        Ok(())
    }
}

impl Default for MotorParams {
    fn default() -> Self {
        Self {
            curve_degree: Self::DEFAULT_CURVE_DEGREE,
            min_intensity: Self::DEFAULT_MIN_INTENSITY,
            min_instant_intensity: Self::DEFAULT_MIN_INSTANT_INTENSITY,
            warmup: Self::DEFAULT_WARMUP,
        }
    }
}

/// One vibration motor on one driver outlet.
///
/// Cloning yields another handle to the same motor.
#[derive(Debug, Clone)]
pub struct VibrationMotor {
    inner: Arc<MotorInner>,
}

#[derive(Debug)]
struct MotorInner {
    driver: Arc<dyn PwmDriver>,
    outlet: u8,
    params: MotorParams,
    state: Mutex<MotorState>,
}

#[derive(Debug, Default)]
struct MotorState {
    claims: PrioritizedIntensity,
    /// Output the motor should settle at.
    target: f32,
    /// Last output written, or attempted, to the driver.
    current: f32,
    running_since: Option<Instant>,
    warmup: Option<PendingWarmup>,
    generation: u64,
}

#[derive(Debug)]
struct PendingWarmup {
    generation: u64,
    handle: JoinHandle<()>,
}

impl MotorState {
    fn cancel_warmup(&mut self) {
        if let Some(pending) = self.warmup.take() {
            pending.handle.abort();
        }
    }

    fn running_for(&self, now: Instant) -> Duration {
        self.running_since
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since))
    }
}

impl VibrationMotor {
    /// Motor on `outlet` of `driver`.
    pub fn new(driver: Arc<dyn PwmDriver>, outlet: u8, params: MotorParams) -> Self {
        Self {
            inner: Arc::new(MotorInner {
                driver,
                outlet,
                params,
                state: Mutex::new(MotorState::default()),
            }),
        }
    }

    /// Submit a claim and drive the motor towards the resulting target.
    ///
    /// A target that cannot be applied cold pins the output at the instant
    /// start level and schedules the target for when the accumulated running
    /// time reaches the warmup. While that timer is pending, further calls
    /// only update the target it will apply.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`ActorError::InvalidIntensity`] for values outside `[0, 1]`; no state changes
    /// - [`ActorError::Driver`] if the bus write fails; the attempted output is kept
    /// - [`ActorError::NoRuntime`] if a warmup is needed outside a runtime
    pub fn set_intensity(&self, intensity: f32, priority: i32) -> ActorResult<()> {
        if !intensity.is_finite() || !(0.0..=1.0).contains(&intensity) {
            return Err(ActorError::InvalidIntensity(intensity));
        }

        let inner = &self.inner;
        let params = &inner.params;
        let now = Instant::now();
        let mut state = inner.state.lock();

        state.claims.set(priority, intensity);
        state.target = params.map_intensity(state.claims.evaluate());
        let target = state.target;

        let direct = target <= SENSITIVITY
            || target >= params.min_instant_intensity
            || state.running_for(now) >= params.warmup;

        if direct {
            state.cancel_warmup();
            return inner.apply(&mut state, target, now);
        }

        if state.warmup.is_some() {
            trace!(outlet = inner.outlet, target, "warmup pending, target updated");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| ActorError::NoRuntime)?;

        let pinned = if state.current < params.min_instant_intensity {
            inner.apply(&mut state, params.min_instant_intensity, now)
        } else {
            Ok(())
        };

        let remaining = params.warmup.saturating_sub(state.running_for(now));
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        debug!(
            outlet = inner.outlet,
            target,
            remaining_ms = remaining.as_millis() as u64,
            "warming up"
        );

        let timer_inner = Arc::clone(inner);
        let handle = runtime.spawn(async move {
            sleep(remaining).await;
            timer_inner.finish_warmup(generation);
        });
        state.warmup = Some(PendingWarmup { generation, handle });

        pinned
    }

    /// Withdraw every claim and switch the motor off.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Driver`] if the bus write fails.
    pub fn reset(&self) -> ActorResult<()> {
        let mut state = self.inner.state.lock();
        state.claims.reset();
        state.cancel_warmup();
        state.target = 0.0;
        self.inner.apply(&mut state, 0.0, Instant::now())
    }

    /// Effective claim intensity before mapping.
    pub fn intensity(&self) -> f32 {
        self.inner.state.lock().claims.evaluate()
    }

    /// Highest outstanding claim priority, or 0.
    pub fn top_priority(&self) -> i32 {
        self.inner.state.lock().claims.top_priority()
    }

    /// Mapped output the motor is heading for.
    pub fn target(&self) -> f32 {
        self.inner.state.lock().target
    }

    /// Last output written to the driver.
    pub fn current_output(&self) -> f32 {
        self.inner.state.lock().current
    }

    /// Whether a warmup timer is outstanding.
    pub fn is_warming(&self) -> bool {
        self.inner.state.lock().warmup.is_some()
    }

    /// Time since the motor last started from standstill.
    pub fn running_for(&self) -> Duration {
        self.inner.state.lock().running_for(Instant::now())
    }

    /// Response parameters.
    pub fn params(&self) -> &MotorParams {
        &self.inner.params
    }

    /// Driver outlet.
    pub fn outlet(&self) -> u8 {
        self.inner.outlet
    }

    /// Driver the motor is wired to.
    pub fn driver(&self) -> &Arc<dyn PwmDriver> {
        &self.inner.driver
    }
}

impl MotorInner {
    fn apply(&self, state: &mut MotorState, output: f32, now: Instant) -> ActorResult<()> {
        if output <= SENSITIVITY {
            state.running_since = None;
        } else if state.running_since.is_none() {
            state.running_since = Some(now);
        }

        if (output - state.current).abs() < SENSITIVITY {
            return Ok(());
        }

        state.current = output;
        trace!(outlet = self.outlet, output, "setting output");
        self.driver
            .set_pwm(self.outlet, 0, intensity_to_tick(output))
            .map_err(ActorError::from)
    }

    fn finish_warmup(&self, generation: u64) {
        let mut state = self.state.lock();
        let current = state.warmup.as_ref().map(|pending| pending.generation);
        if current != Some(generation) {
            return;
        }
        state.warmup = None;

        let target = state.target;
        if let Err(e) = self.apply(&mut state, target, Instant::now()) {
            warn!(outlet = self.outlet, target, error = %e, "failed to apply target after warmup");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mapping_endpoints() {
        let params = MotorParams::default();
        assert_abs_diff_eq!(params.map_intensity(0.0), 0.0);
        assert_abs_diff_eq!(params.map_intensity(SENSITIVITY / 2.0), 0.0);
        assert_abs_diff_eq!(params.map_intensity(1.0), 1.0);
    }

    #[test]
    fn test_mapping_curve() {
        let params = MotorParams::default();
        let expected = 0.3 + 0.7 * 0.1f32.powf(1.5);
        assert_abs_diff_eq!(params.map_intensity(0.1), expected, epsilon = 1e-6);
        assert!(params.map_intensity(0.1) < params.min_instant_intensity);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let params = MotorParams {
            min_intensity: 1.5,
            ..MotorParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ActorError::InvalidParameter {
                name: "min_intensity",
                ..
            })
        ));

        let params = MotorParams {
            curve_degree: 0.0,
            ..MotorParams::default()
        };
        assert!(params.validate().is_err());
        assert!(MotorParams::default().validate().is_ok());
    }
}
