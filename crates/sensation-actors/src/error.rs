//! Actor error types

use sensation_protocol::Region;
use thiserror::Error;

/// Failure reported by the PWM driver layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// Bus transfer failed
    #[error("I2C transfer to 0x{address:02X} failed: {reason}")]
    Transfer {
        /// Chip address
        address: u16,
        /// Underlying cause
        reason: String,
    },

    /// No chip acknowledged at the address
    #[error("No device answering at 0x{address:02X} on bus {bus}")]
    NotAnswering {
        /// Bus number
        bus: u8,
        /// Chip address
        address: u16,
    },

    /// Outlet outside the chip's channel range
    #[error("Outlet {outlet} out of range (max {max})")]
    InvalidOutlet {
        /// Requested outlet
        outlet: u8,
        /// Highest valid outlet
        max: u8,
    },
}

/// Actor error type
#[derive(Debug, Error)]
pub enum ActorError {
    /// Intensity outside `[0, 1]` or not finite
    #[error("Intensity not in interval [0, 1]: {0}")]
    InvalidIntensity(f32),

    /// Motor parameter out of range
    #[error("Invalid motor parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// No actor configured at the address
    #[error("No actor configured with index {index} in region {region}")]
    UnknownActor {
        /// Region
        region: Region,
        /// Index inside the region
        index: u32,
    },

    /// Region name not part of the schema
    #[error("Region with unknown name '{0}'")]
    UnknownRegion(String),

    /// Second definition of the same actor
    #[error("Multiple actors configured with index {index} in region {region}")]
    DuplicateActor {
        /// Region
        region: Region,
        /// Index inside the region
        index: u32,
    },

    /// Hardware write failed
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Warmup timers need a running tokio runtime
    #[error("No async runtime available to schedule motor warmup")]
    NoRuntime,

    /// Configuration file could not be read or parsed
    #[error("Invalid actor configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActorError {
    /// Whether the caller can carry on with other commands.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ActorError::InvalidIntensity(_)
                | ActorError::UnknownActor { .. }
                | ActorError::Driver(_)
        )
    }

    /// Create an unknown actor error
    pub fn unknown_actor(region: Region, index: u32) -> Self {
        ActorError::UnknownActor { region, index }
    }
}

impl From<serde_yaml::Error> for ActorError {
    fn from(err: serde_yaml::Error) -> Self {
        ActorError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ActorError {
    fn from(err: serde_json::Error) -> Self {
        ActorError::Config(err.to_string())
    }
}

/// Specialized Result type for actor operations
pub type ActorResult<T> = std::result::Result<T, ActorError>;
