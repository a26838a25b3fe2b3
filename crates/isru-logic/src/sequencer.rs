//! Per-tick sequencing: host gating, clock priming, elapsed-time clamping,
//! then resolve and apply.
//!
//! [`tick`] is a pure step over `(config, state, frame)` plus the injected
//! store. It returns the next state and what happened; any host scheduler
//! can call it once per fixed step.
//!
//! Clock handling: the first observed tick only records the current time.
//! After that each tick accounts for `min(now - last, max_delta_time)` and
//! advances the timestamp by exactly that, so time lost to the clamp is
//! worked off by later ticks instead of disappearing.

use serde::{Deserialize, Serialize};

use crate::applier::{apply, ApplyReport};
use crate::constants::{
    DEFAULT_FRAME_DELTA, ELECTRICITY_MAX_DELTA_TIME, MAX_DELTA_TIME, MIN_TIME_SINCE_LOAD,
};
use crate::converter::ConverterConfig;
use crate::resolver::{resolve, Resolution, TickContext};
use crate::state::{ConverterPhase, ConverterState, ConverterStatus};
use crate::store::ResourceStore;

/// Clamps applied by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConverterLimits {
    pub max_delta_time: f64,
    pub electricity_max_delta_time: f64,
    pub min_time_since_load: f64,
}

impl Default for ConverterLimits {
    fn default() -> Self {
        Self {
            max_delta_time: MAX_DELTA_TIME,
            electricity_max_delta_time: ELECTRICITY_MAX_DELTA_TIME,
            min_time_since_load: MIN_TIME_SINCE_LOAD,
        }
    }
}

/// What the host knows at the moment it calls [`tick`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostFrame {
    /// Current simulation time (monotonically non-decreasing).
    pub now: f64,
    /// Length of the host's fixed step.
    pub frame_delta: f64,
    /// Seconds since the scene was loaded.
    pub time_since_load: f64,
    /// Host-level readiness (e.g. world finished loading).
    pub ready: bool,
    pub atmosphere_has_oxygen: bool,
}

impl HostFrame {
    /// A ready frame at `now` with the default step, long after load.
    pub fn at(now: f64) -> Self {
        Self {
            now,
            frame_delta: DEFAULT_FRAME_DELTA,
            time_since_load: f64::INFINITY,
            ready: true,
            atmosphere_has_oxygen: true,
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickEffect {
    /// Host not ready or scene too fresh; nothing changed.
    Waiting,
    /// First tick: clock recorded, no conversion.
    Primed,
    /// Resolution failed; status explains why.
    Blocked(ConverterStatus),
    /// Resources moved.
    Converted { amount: f64, report: ApplyReport },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub state: ConverterState,
    pub effect: TickEffect,
    /// Seconds accounted for by this tick (0 unless the clock was running).
    pub elapsed: f64,
}

/// Advance one converter by one host step.
pub fn tick<S: ResourceStore + ?Sized>(
    config: &ConverterConfig,
    state: &ConverterState,
    frame: &HostFrame,
    limits: &ConverterLimits,
    store: &mut S,
) -> TickOutcome {
    let mut next = state.clone();

    if !frame.ready || frame.time_since_load < limits.min_time_since_load {
        return TickOutcome {
            state: next,
            effect: TickEffect::Waiting,
            elapsed: 0.0,
        };
    }

    let last = match state.phase() {
        ConverterPhase::Uninitialized => {
            next.last_update_time = Some(frame.now);
            return TickOutcome {
                state: next,
                effect: TickEffect::Primed,
                elapsed: 0.0,
            };
        }
        ConverterPhase::Running(last) => last,
    };

    let elapsed = (frame.now - last).clamp(0.0, limits.max_delta_time);
    next.last_update_time = Some(last + elapsed);

    let ctx = TickContext {
        elapsed,
        frame_delta: frame.frame_delta,
        electricity_max_delta: limits.electricity_max_delta_time,
        atmosphere_has_oxygen: frame.atmosphere_has_oxygen,
    };

    let effect = match resolve(config, &next, &ctx, store) {
        Resolution::Blocked(status) => {
            next.status = status.clone();
            TickEffect::Blocked(status)
        }
        Resolution::Feasible(amount) => {
            let report = apply(config, amount, &ctx, store);
            next.status = ConverterStatus::Running;
            TickEffect::Converted { amount, report }
        }
    };

    TickOutcome {
        state: next,
        effect,
        elapsed,
    }
}
