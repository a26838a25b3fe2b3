//! Rate resolution: the largest conversion amount every constraint allows.
//!
//! Resolution starts from the ideal amount (`rate × elapsed`) and walks the
//! constraints in a fixed order: every capacity-limited output in list
//! order, then every input in list order. Each constraint derives what it
//! needs from the amount left by the previous one and shrinks it
//! proportionally when the store cannot cover that, so the amount only ever
//! goes down and the final value satisfies all constraints at once. The
//! first constraint that drives the amount to (near) zero names the status.
//!
//! The electric resource is special: its per-tick share is capped at
//! `rate × max(electricity_max_delta, frame_delta)` so a long catch-up tick
//! cannot drain or overfill the electrical buffer in one go.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FRAME_DELTA, ELECTRICITY_MAX_DELTA_TIME, NEGLIGIBLE_AMOUNT};
use crate::converter::ConverterConfig;
use crate::ratio::ResourceRatio;
use crate::state::{ConverterState, ConverterStatus};
use crate::store::ResourceStore;

/// Facts for a single tick, produced fresh by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickContext {
    /// Seconds of conversion to account for, already clamped.
    pub elapsed: f64,
    /// Length of the host's fixed step.
    pub frame_delta: f64,
    /// Tighter clamp for the electric resource.
    pub electricity_max_delta: f64,
    pub atmosphere_has_oxygen: bool,
}

impl TickContext {
    pub fn new(elapsed: f64) -> Self {
        Self {
            elapsed,
            frame_delta: DEFAULT_FRAME_DELTA,
            electricity_max_delta: ELECTRICITY_MAX_DELTA_TIME,
            atmosphere_has_oxygen: true,
        }
    }

    /// Ideal amount before any constraint.
    pub fn desired_amount(&self, conversion_rate: f64) -> f64 {
        conversion_rate * self.elapsed
    }

    /// Largest amount the electric resource may be scaled by this tick.
    pub fn electricity_cap(&self, conversion_rate: f64) -> f64 {
        self.desired_amount(conversion_rate)
            .min(conversion_rate * self.electricity_max_delta.max(self.frame_delta))
    }
}

/// Result of resolving one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    /// Convert this many units (always above the negligible threshold,
    /// unless the converter has no constraints at all).
    Feasible(f64),
    /// Nothing moves this tick.
    Blocked(ConverterStatus),
}

impl Resolution {
    pub fn amount(&self) -> f64 {
        match self {
            Resolution::Feasible(amount) => *amount,
            Resolution::Blocked(_) => 0.0,
        }
    }

    pub fn status(&self) -> ConverterStatus {
        match self {
            Resolution::Feasible(_) => ConverterStatus::Running,
            Resolution::Blocked(status) => status.clone(),
        }
    }
}

/// Which way a constraint's resource moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Withdraw,
    Deposit,
}

impl Flow {
    fn sign(self) -> f64 {
        match self {
            Flow::Withdraw => 1.0,
            Flow::Deposit => -1.0,
        }
    }
}

/// Shrink `desired` so that `ratio`'s resource can cover it.
fn constrain<S: ResourceStore + ?Sized>(
    desired: f64,
    electricity_cap: f64,
    ratio: &ResourceRatio,
    flow: Flow,
    store: &S,
) -> f64 {
    let sign = flow.sign();
    if ratio.resource.is_electric() && desired > electricity_cap {
        let required = electricity_cap * ratio.ratio;
        let available = (sign * store.available_for(&ratio.resource, sign * required)).max(0.0);
        if available < required {
            return desired * (available / required);
        }
        desired
    } else {
        let required = desired * ratio.ratio;
        let available = (sign * store.available_for(&ratio.resource, sign * required)).max(0.0);
        if available < required {
            return available / ratio.ratio;
        }
        desired
    }
}

/// Compute the feasible conversion amount for this tick.
///
/// Never touches the store mutably; [`crate::applier::apply`] does that.
pub fn resolve<S: ResourceStore + ?Sized>(
    config: &ConverterConfig,
    state: &ConverterState,
    ctx: &TickContext,
    store: &S,
) -> Resolution {
    if !state.is_enabled(config) {
        return Resolution::Blocked(ConverterStatus::Inactive);
    }
    if config.requires_oxygen_atmo && !ctx.atmosphere_has_oxygen {
        return Resolution::Blocked(ConverterStatus::AtmoLacksOxygen);
    }

    let rate = config.conversion_rate;
    let electricity_cap = ctx.electricity_cap(rate);
    let mut desired = ctx.desired_amount(rate);

    for output in config.outputs.iter().filter(|o| !o.allow_extra) {
        desired = constrain(desired, electricity_cap, output, Flow::Deposit, store);
        if desired <= NEGLIGIBLE_AMOUNT {
            return Resolution::Blocked(ConverterStatus::NoSpaceFor(output.resource.name.clone()));
        }
    }

    for input in &config.inputs {
        desired = constrain(desired, electricity_cap, input, Flow::Withdraw, store);
        if desired <= NEGLIGIBLE_AMOUNT {
            return Resolution::Blocked(ConverterStatus::NotEnough(input.resource.name.clone()));
        }
    }

    Resolution::Feasible(desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConverterDefinition;
    use crate::resources::ResourceLibrary;
    use crate::store::{InMemoryStore, Tank};

    fn lib() -> ResourceLibrary {
        ResourceLibrary::stock()
    }

    fn config(rate: f64, inputs: &str, outputs: &str) -> ConverterConfig {
        let def = ConverterDefinition {
            converter_name: "Test".to_string(),
            conversion_rate: rate,
            input_resources: inputs.to_string(),
            output_resources: outputs.to_string(),
            ..ConverterDefinition::default()
        };
        ConverterConfig::from_definition(&def, &lib())
    }

    fn enabled() -> ConverterState {
        ConverterState {
            enabled: true,
            ..ConverterState::default()
        }
    }

    fn store(tanks: &[(&str, f64, f64)]) -> InMemoryStore {
        let lib = lib();
        let mut store = InMemoryStore::new();
        for (name, amount, capacity) in tanks {
            store.add_tank(lib.get(name).unwrap(), Tank::new(*amount, *capacity));
        }
        store
    }

    #[test]
    fn test_unconstrained_runs_at_ideal() {
        let cfg = config(2.0, "Ore 1", "Metals 1 false");
        let s = store(&[("Ore", 500.0, 500.0), ("Metals", 0.0, f64::INFINITY)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(10.0), &s);
        assert_eq!(r, Resolution::Feasible(20.0));
        assert_eq!(r.status(), ConverterStatus::Running);
    }

    #[test]
    fn test_input_shortage_shrinks() {
        let cfg = config(2.0, "Ore 1", "Metals 1 false");
        let s = store(&[("Ore", 5.0, 500.0), ("Metals", 0.0, f64::INFINITY)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(10.0), &s);
        assert_eq!(r, Resolution::Feasible(5.0));
    }

    #[test]
    fn test_ratio_scales_requirement() {
        // 0.5 Ore per unit, 3 Ore available -> 6 units.
        let cfg = config(1.0, "Ore 0.5", "");
        let s = store(&[("Ore", 3.0, 10.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(100.0), &s);
        assert!((r.amount() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_output_blocks() {
        let cfg = config(2.0, "Ore 1", "Metals 1 false");
        let s = store(&[("Ore", 500.0, 500.0), ("Metals", 10.0, 10.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(10.0), &s);
        assert_eq!(
            r,
            Resolution::Blocked(ConverterStatus::NoSpaceFor("Metals".into()))
        );
        assert_eq!(r.amount(), 0.0);
    }

    #[test]
    fn test_empty_input_blocks() {
        let cfg = config(2.0, "Ore 1", "");
        let s = store(&[("Ore", 0.0, 500.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(10.0), &s);
        assert_eq!(r.status().to_string(), "Not enough Ore");
    }

    #[test]
    fn test_allow_extra_output_never_constrains() {
        let cfg = config(2.0, "Ore 1", "Waste 1 true");
        let s = store(&[("Ore", 500.0, 500.0), ("Waste", 0.0, 0.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(10.0), &s);
        assert_eq!(r, Resolution::Feasible(20.0));
    }

    #[test]
    fn test_outputs_checked_before_inputs() {
        // Both would block; the output is reported.
        let cfg = config(1.0, "Ore 1", "Metals 1 false");
        let s = store(&[("Ore", 0.0, 10.0), ("Metals", 10.0, 10.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(1.0), &s);
        assert_eq!(r.status().to_string(), "No space for more Metals");
    }

    #[test]
    fn test_list_order_picks_first_blocker() {
        let cfg = config(1.0, "Water 1 Ore 1", "");
        let s = store(&[("Water", 0.0, 10.0), ("Ore", 0.0, 10.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(1.0), &s);
        assert_eq!(r.status().to_string(), "Not enough Water");
    }

    #[test]
    fn test_constraints_compose_sequentially() {
        // Output room for 8 units, then input covers 4 of those 8.
        let cfg = config(1.0, "Ore 2", "Metals 1 false");
        let s = store(&[("Ore", 8.0, 100.0), ("Metals", 92.0, 100.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(50.0), &s);
        assert!((r.amount() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_is_inactive() {
        let cfg = config(1.0, "Ore 1", "");
        let s = store(&[("Ore", 10.0, 10.0)]);
        let r = resolve(&cfg, &ConverterState::new(), &TickContext::new(1.0), &s);
        assert_eq!(r, Resolution::Blocked(ConverterStatus::Inactive));
    }

    #[test]
    fn test_oxygen_requirement() {
        let mut cfg = config(1.0, "Ore 1", "");
        cfg.requires_oxygen_atmo = true;
        let s = store(&[("Ore", 10.0, 10.0)]);
        let mut ctx = TickContext::new(1.0);
        ctx.atmosphere_has_oxygen = false;
        assert_eq!(
            resolve(&cfg, &enabled(), &ctx, &s),
            Resolution::Blocked(ConverterStatus::AtmoLacksOxygen)
        );
        ctx.atmosphere_has_oxygen = true;
        assert_eq!(resolve(&cfg, &enabled(), &ctx, &s), Resolution::Feasible(1.0));
    }

    #[test]
    fn test_electricity_cap_bounds_long_ticks() {
        let ctx = TickContext::new(3600.0);
        assert_eq!(ctx.desired_amount(2.0), 7200.0);
        assert_eq!(ctx.electricity_cap(2.0), 2.0);

        let short = TickContext::new(0.5);
        assert_eq!(short.electricity_cap(2.0), 1.0, "cap never exceeds desired");
    }

    #[test]
    fn test_electric_input_scaled_against_cap() {
        // Cap is 1 unit of conversion (rate 1, 1s); EC ratio 10 -> needs 10 EC.
        // Only 5 EC in the buffer: halve the whole desired amount.
        let cfg = config(1.0, "ElectricCharge 10 Ore 0.001", "");
        let s = store(&[("ElectricCharge", 5.0, 100.0), ("Ore", 1000.0, 1000.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(100.0), &s);
        assert!((r.amount() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_electric_buffer_covering_cap_does_not_limit() {
        let cfg = config(1.0, "ElectricCharge 10", "");
        let s = store(&[("ElectricCharge", 10.0, 100.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(100.0), &s);
        assert_eq!(r, Resolution::Feasible(100.0));
    }

    #[test]
    fn test_electric_output_scaled_against_cap() {
        // Fuel cell on a 100 s catch-up: cap is 1 unit, which would deposit
        // 1.5 EC. Only 0.6 EC of room: 100 × 0.6 / 1.5 = 40 units.
        let cfg = config(1.0, "", "ElectricCharge 1.5 false");
        let s = store(&[("ElectricCharge", 99.4, 100.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(100.0), &s);
        assert!((r.amount() - 40.0).abs() < 1e-9, "{:?}", r);
        assert_eq!(r.status(), ConverterStatus::Running);
    }

    #[test]
    fn test_electric_output_room_covering_cap_does_not_limit() {
        let cfg = config(1.0, "", "ElectricCharge 1.5 false");
        let s = store(&[("ElectricCharge", 98.0, 100.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(100.0), &s);
        assert_eq!(r, Resolution::Feasible(100.0));
    }

    #[test]
    fn test_full_electric_output_blocks() {
        let cfg = config(1.0, "LiquidFuel 0.01", "ElectricCharge 1.5 false");
        let s = store(&[("LiquidFuel", 100.0, 100.0), ("ElectricCharge", 100.0, 100.0)]);
        let r = resolve(&cfg, &enabled(), &TickContext::new(100.0), &s);
        assert_eq!(r.status().to_string(), "No space for more ElectricCharge");
    }

    #[test]
    fn test_electric_paths_agree_at_boundary() {
        // desired == cap takes the ordinary path; a hair above takes the capped
        // one. Both give the same answer.
        let cfg = config(1.0, "ElectricCharge 4", "");
        let s = store(&[("ElectricCharge", 2.0, 100.0)]);
        let at = resolve(&cfg, &enabled(), &TickContext::new(1.0), &s).amount();
        let above = resolve(&cfg, &enabled(), &TickContext::new(1.0 + 1e-12), &s).amount();
        assert!((at - 0.5).abs() < 1e-12);
        assert!((above - at).abs() < 1e-9);
    }

    #[test]
    fn test_result_never_exceeds_ideal() {
        let cfg = config(3.0, "Ore 1 Water 2", "Metals 1 false Waste 0.5 true");
        let s = store(&[
            ("Ore", 1000.0, 1000.0),
            ("Water", 1000.0, 1000.0),
            ("Metals", 0.0, 1000.0),
        ]);
        for elapsed in [0.1, 1.0, 10.0, 100.0] {
            let ctx = TickContext::new(elapsed);
            let amount = resolve(&cfg, &enabled(), &ctx, &s).amount();
            assert!(amount >= 0.0 && amount <= ctx.desired_amount(3.0) + 1e-12);
        }
    }
}
