//! Priority arbitration of intensity claims.

use std::collections::BTreeMap;

/// Intensity changes and claims below this are treated as noise or "off".
pub const SENSITIVITY: f32 = 0.005;

/// Outstanding intensity claims of one actor, keyed by priority.
///
/// Only the claim with the highest priority is effective. A claim below
/// [`SENSITIVITY`] withdraws the priority instead of storing an explicit zero,
/// so a lower-priority claim becomes effective again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrioritizedIntensity {
    claims: BTreeMap<i32, f32>,
}

impl PrioritizedIntensity {
    /// Empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, overwrite or withdraw the claim at `priority`.
    pub fn set(&mut self, priority: i32, intensity: f32) {
        if intensity < SENSITIVITY {
            self.claims.remove(&priority);
        } else {
            self.claims.insert(priority, intensity);
        }
    }

    /// Intensity of the highest-priority claim, or 0.
    pub fn evaluate(&self) -> f32 {
        self.claims
            .last_key_value()
            .map_or(0.0, |(_, intensity)| *intensity)
    }

    /// Highest outstanding priority, or 0 when there are no claims.
    pub fn top_priority(&self) -> i32 {
        self.claims
            .last_key_value()
            .map_or(0, |(priority, _)| *priority)
    }

    /// Withdraw every claim.
    pub fn reset(&mut self) {
        self.claims.clear();
    }

    /// Number of outstanding claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether no claim is outstanding.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
