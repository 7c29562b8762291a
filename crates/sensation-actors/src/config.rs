//! Actor topology configuration.
//!
//! ```yaml
//! vibration:
//!   actor_min_intensity: 0.3           # global default
//!   regions:
//!     - name: LEFT_HAND
//!       i2c_bus_number: 1
//!       driver_address: "0x40"
//!       actor_min_intensity_warmup: 0.25  # region default
//!       actors:
//!         - { index: 0, outlet: 0, position: thumb, min_intensity: 0.2 }
//! ```
//!
//! Motor parameters resolve per actor, then region, then the global section,
//! then the built-in [`MotorParams`] defaults.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use sensation_protocol::Region;
use serde::{Deserialize, Serialize};

use crate::error::{ActorError, ActorResult};
use crate::motor::MotorParams;

/// Bus number used when a region does not name one.
pub const DEFAULT_I2C_BUS: u8 = 1;

/// Bus and address of one driver chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriverAddress {
    /// I2C bus number.
    pub bus: u8,
    /// 7-bit chip address.
    pub address: u16,
}

impl DriverAddress {
    /// Address `address` on bus `bus`.
    pub const fn new(bus: u8, address: u16) -> Self {
        Self { bus, address }
    }
}

impl fmt::Display for DriverAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:0x{:02X}", self.bus, self.address)
    }
}

/// Chip address as written in configuration: an integer or a `"0x.."` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AddressRepr", into = "AddressRepr")]
pub struct ChipAddress(pub u16);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Number(u16),
    Text(String),
}

impl TryFrom<AddressRepr> for ChipAddress {
    type Error = String;

    fn try_from(repr: AddressRepr) -> Result<Self, Self::Error> {
        match repr {
            AddressRepr::Number(n) => Ok(ChipAddress(n)),
            AddressRepr::Text(text) => {
                let trimmed = text.trim();
                let parsed = match trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                {
                    Some(hex) => u16::from_str_radix(hex, 16),
                    None => trimmed.parse(),
                };
                parsed
                    .map(ChipAddress)
                    .map_err(|e| format!("invalid driver address '{text}': {e}"))
            }
        }
    }
}

impl From<ChipAddress> for AddressRepr {
    fn from(address: ChipAddress) -> Self {
        AddressRepr::Text(format!("0x{:02X}", address.0))
    }
}

/// Motor parameter defaults shared by every actor of a scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedActorSettings {
    /// Mapping curve exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_mapping_curve_degree: Option<f32>,
    /// Sustain threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_min_intensity: Option<f32>,
    /// Warmup in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_min_intensity_warmup: Option<f64>,
    /// Instant-start threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_min_instant_intensity: Option<f32>,
}

/// Root of an actor configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Vibration motor wiring.
    pub vibration: VibrationSection,
}

/// The `vibration` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VibrationSection {
    /// Global parameter defaults.
    #[serde(flatten)]
    pub defaults: SharedActorSettings,
    /// Region definitions; a region may appear more than once.
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
}

/// One region's actors on one driver chip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Schema name of the region, e.g. `LEFT_HAND`.
    pub name: String,
    /// I2C bus of the driver chip.
    #[serde(default = "default_bus")]
    pub i2c_bus_number: u8,
    /// Address of the driver chip.
    pub driver_address: ChipAddress,
    /// Region-level parameter defaults.
    #[serde(flatten)]
    pub defaults: SharedActorSettings,
    /// Actors wired to this chip.
    #[serde(default)]
    pub actors: Vec<ActorEntry>,
}

fn default_bus() -> u8 {
    DEFAULT_I2C_BUS
}

impl RegionConfig {
    /// Bus and address of this region's chip.
    pub fn driver(&self) -> DriverAddress {
        DriverAddress::new(self.i2c_bus_number, self.driver_address.0)
    }

    /// The region named by this section.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::UnknownRegion`] for a name outside the schema.
    pub fn region(&self) -> ActorResult<Region> {
        Region::from_str_name(&self.name).ok_or_else(|| ActorError::UnknownRegion(self.name.clone()))
    }
}

/// One actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorEntry {
    /// Index inside the region, as addressed by clients.
    pub index: u32,
    /// Driver outlet.
    pub outlet: u8,
    /// Free-form mounting description.
    #[serde(default)]
    pub position: String,
    /// Mapping curve exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_curve_degree: Option<f32>,
    /// Sustain threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_intensity: Option<f32>,
    /// Warmup in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_intensity_warmup: Option<f64>,
    /// Instant-start threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_instant_intensity: Option<f32>,
}

impl ActorConfig {
    /// Parse a YAML document. JSON is valid YAML and is accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Config`] on malformed input.
    pub fn from_yaml_str(text: &str) -> ActorResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Config`] on malformed input.
    pub fn from_json_str(text: &str) -> ActorResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> ActorResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    /// Resolve the motor parameters of `actor` inside `region`.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::InvalidParameter`] for a warmup that is negative
    /// or not a number; the other values are checked by
    /// [`MotorParams::validate`].
    pub fn resolve_params(&self, region: &RegionConfig, actor: &ActorEntry) -> ActorResult<MotorParams> {
        let global = &self.vibration.defaults;
        let local = &region.defaults;
        let fallback = MotorParams::default();

        let warmup_secs = actor
            .min_intensity_warmup
            .or(local.actor_min_intensity_warmup)
            .or(global.actor_min_intensity_warmup);

        let warmup = match warmup_secs {
            None => fallback.warmup,
            Some(secs) => Duration::try_from_secs_f64(secs)
                .map_err(|_overflow| ActorError::InvalidParameter { name: "warmup", value: secs })?,
        };

        Ok(MotorParams {
            curve_degree: actor
                .mapping_curve_degree
                .or(local.actor_mapping_curve_degree)
                .or(global.actor_mapping_curve_degree)
                .unwrap_or(fallback.curve_degree),
            min_intensity: actor
                .min_intensity
                .or(local.actor_min_intensity)
                .or(global.actor_min_intensity)
                .unwrap_or(fallback.min_intensity),
            min_instant_intensity: actor
                .min_instant_intensity
                .or(local.actor_min_instant_intensity)
                .or(global.actor_min_instant_intensity)
                .unwrap_or(fallback.min_instant_intensity),
            warmup,
        })
    }
}

impl std::str::FromStr for ActorConfig {
    type Err = ActorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_yaml_str(s)
    }
}
