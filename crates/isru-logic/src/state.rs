//! Converter runtime state and status messages.

use serde::{Deserialize, Serialize};

use crate::constants::UNSET_TIMESTAMP;
use crate::converter::ConverterConfig;

/// Why the converter is (or is not) running, as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConverterStatus {
    Unknown,
    Inactive,
    AtmoLacksOxygen,
    /// A capacity-limited output has no room left.
    NoSpaceFor(String),
    /// An input is exhausted.
    NotEnough(String),
    Running,
}

impl std::fmt::Display for ConverterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Inactive => write!(f, "Inactive"),
            Self::AtmoLacksOxygen => write!(f, "Atmo lacks oxygen."),
            Self::NoSpaceFor(name) => write!(f, "No space for more {}", name),
            Self::NotEnough(name) => write!(f, "Not enough {}", name),
            Self::Running => write!(f, "Running"),
        }
    }
}

/// Where a converter is in its clock lifecycle.
///
/// Priming is the single tick that leaves `Uninitialized`: it records the
/// clock and reports [`crate::sequencer::TickEffect::Primed`] without
/// converting. No state rests between that tick and `Running`, so priming
/// is an effect rather than a phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConverterPhase {
    /// No timestamp yet: the next tick only primes the clock.
    Uninitialized,
    /// Clock primed at the given time; every tick resolves and applies.
    Running(f64),
}

/// Per-instance mutable state. Only `enabled` and the timestamp persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterState {
    pub enabled: bool,
    /// Simulation time up to which conversion has been accounted.
    pub last_update_time: Option<f64>,
    pub status: ConverterStatus,
}

impl Default for ConverterState {
    fn default() -> Self {
        Self {
            enabled: false,
            last_update_time: None,
            status: ConverterStatus::Unknown,
        }
    }
}

impl ConverterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State restored from persisted fields.
    pub fn restore(enabled: bool, persisted_time: f64) -> Self {
        let mut state = Self {
            enabled,
            ..Self::default()
        };
        state.restore_timestamp(persisted_time);
        state
    }

    pub fn phase(&self) -> ConverterPhase {
        match self.last_update_time {
            None => ConverterPhase::Uninitialized,
            Some(last) => ConverterPhase::Running(last),
        }
    }

    /// Effective enabled flag: always-on converters cannot be off.
    pub fn is_enabled(&self, config: &ConverterConfig) -> bool {
        config.always_on || self.enabled
    }

    /// Timestamp in its persisted form. Unset is stored as
    /// [`UNSET_TIMESTAMP`], which no simulation time can take.
    pub fn persisted_timestamp(&self) -> f64 {
        self.last_update_time.unwrap_or(UNSET_TIMESTAMP)
    }

    /// Inverse of [`Self::persisted_timestamp`]. Negative or non-finite
    /// values restore as unset; `0.0` is a real time.
    pub fn restore_timestamp(&mut self, persisted: f64) {
        self.last_update_time = if persisted.is_finite() && persisted >= 0.0 {
            Some(persisted)
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(ConverterStatus::Running.to_string(), "Running");
        assert_eq!(
            ConverterStatus::NoSpaceFor("Water".into()).to_string(),
            "No space for more Water"
        );
        assert_eq!(
            ConverterStatus::NotEnough("Ore".into()).to_string(),
            "Not enough Ore"
        );
        assert_eq!(
            ConverterStatus::AtmoLacksOxygen.to_string(),
            "Atmo lacks oxygen."
        );
    }

    #[test]
    fn test_timestamp_persistence() {
        let mut state = ConverterState::new();
        assert_eq!(state.phase(), ConverterPhase::Uninitialized);
        assert_eq!(state.persisted_timestamp(), UNSET_TIMESTAMP);
        assert_eq!(
            ConverterState::restore(true, state.persisted_timestamp()).last_update_time,
            None
        );

        state.last_update_time = Some(1234.5);
        let restored = ConverterState::restore(true, state.persisted_timestamp());
        assert_eq!(restored.last_update_time, Some(1234.5));
        assert_eq!(restored.phase(), ConverterPhase::Running(1234.5));
        assert!(restored.enabled);
    }

    #[test]
    fn test_clock_primed_at_zero_survives_persistence() {
        let mut state = ConverterState::new();
        state.last_update_time = Some(0.0);
        let restored = ConverterState::restore(true, state.persisted_timestamp());
        assert_eq!(restored.last_update_time, Some(0.0));
        assert_eq!(restored.phase(), ConverterPhase::Running(0.0));
    }

    #[test]
    fn test_invalid_timestamps_restore_unset() {
        let mut state = ConverterState::new();
        state.restore_timestamp(-1.0);
        assert_eq!(state.last_update_time, None);
        state.restore_timestamp(f64::NAN);
        assert_eq!(state.last_update_time, None);
        state.restore_timestamp(f64::INFINITY);
        assert_eq!(state.last_update_time, None);
    }
}
