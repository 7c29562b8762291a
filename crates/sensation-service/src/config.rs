//! Service configuration.
//!
//! ```yaml
//! bind_address: 0.0.0.0
//! port: 10000
//! actor_config: /etc/sensation/actors.yaml
//! pattern_sample_rate_hz: 10.0
//! teardown_grace_secs: 2.0
//! ```
//!
//! Every field is optional. Files ending in `.json` are parsed as JSON,
//! everything else as YAML.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use sensation_protocol::DEFAULT_MAX_FRAME_SIZE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};

/// Port the daemon listens on by default.
pub const DEFAULT_PORT: u16 = 10000;
/// Pattern sampling rate.
pub const DEFAULT_SAMPLE_RATE_HZ: f32 = 10.0;
/// PWM frequency set on every driver chip.
pub const DEFAULT_PWM_FREQUENCY_HZ: f32 = 1700.0;

/// Daemon configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Interface to listen on.
    pub bind_address: IpAddr,
    /// TCP port.
    pub port: u16,
    /// Actor topology document; no actors are configured without one.
    pub actor_config: Option<PathBuf>,
    /// Rate at which playing patterns emit commands.
    pub pattern_sample_rate_hz: f32,
    /// How long tear-down waits for in-flight work, in seconds.
    pub teardown_grace_secs: f64,
    /// Bytes read from a socket at once.
    pub read_buffer_size: usize,
    /// Largest accepted frame payload.
    pub max_frame_size: usize,
    /// PWM frequency for newly opened drivers.
    pub pwm_frequency_hz: f32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            actor_config: None,
            pattern_sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            teardown_grace_secs: 2.0,
            read_buffer_size: 4096,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
        }
    }
}

impl ServiceConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidConfig`] on malformed or unusable values.
    pub fn from_yaml_str(text: &str) -> ServiceResult<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidConfig`] on malformed or unusable values.
    pub fn from_json_str(text: &str) -> ServiceResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> ServiceResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no service configuration found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_yaml_str(&text)?,
        };
        debug!(path = %path.display(), "loaded service configuration");
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> ServiceResult<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.pattern_sample_rate_hz) {
            return Err(ServiceError::InvalidConfig(format!(
                "pattern_sample_rate_hz must be positive, got {}",
                self.pattern_sample_rate_hz
            )));
        }
        sample_interval(self.pattern_sample_rate_hz)?;
        if !positive(self.pwm_frequency_hz) {
            return Err(ServiceError::InvalidConfig(format!(
                "pwm_frequency_hz must be positive, got {}",
                self.pwm_frequency_hz
            )));
        }
        if Duration::try_from_secs_f64(self.teardown_grace_secs).is_err() {
            return Err(ServiceError::InvalidConfig(format!(
                "teardown_grace_secs must be a non-negative number, got {}",
                self.teardown_grace_secs
            )));
        }
        if self.read_buffer_size == 0 {
            return Err(ServiceError::InvalidConfig(
                "read_buffer_size must not be zero".to_string(),
            ));
        }
        if self.max_frame_size == 0 {
            return Err(ServiceError::InvalidConfig(
                "max_frame_size must not be zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Pause between two pattern samples.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidConfig`] if the rate gives no usable
    /// interval.
    pub fn sample_interval(&self) -> ServiceResult<Duration> {
        sample_interval(self.pattern_sample_rate_hz)
    }

    /// Tear-down grace period.
    pub fn teardown_grace(&self) -> Duration {
        Duration::try_from_secs_f64(self.teardown_grace_secs).unwrap_or(Duration::from_secs(2))
    }
}

/// Pause between samples at `rate_hz`.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidConfig`] unless the interval is non-zero and
/// representable.
pub fn sample_interval(rate_hz: f32) -> ServiceResult<Duration> {
    let invalid = || {
        ServiceError::InvalidConfig(format!(
            "pattern_sample_rate_hz must give a usable sample interval, got {rate_hz}"
        ))
    };
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return Err(invalid());
    }
    match Duration::try_from_secs_f64(1.0 / f64::from(rate_hz)) {
        Ok(interval) if !interval.is_zero() => Ok(interval),
        _ => Err(invalid()),
    }
}
