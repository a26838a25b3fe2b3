//! ISRU Headless Simulation Harness
//!
//! Validates converter logic and vessel data without any host.
//! Runs entirely in-process: no scheduler, no rendering.
//!
//! Usage:
//!   cargo run -p isru-simtest
//!   cargo run -p isru-simtest -- --verbose

use isru_core::prelude::*;
use isru_logic::applier::{apply, TransferDirection};
use isru_logic::converter::{validate_definition, ConverterConfig, ConverterDefinition};
use isru_logic::ratio::{parse_input_ratios, ResourceRatio};
use isru_logic::resolver::{resolve, Resolution, TickContext};
use isru_logic::resources::{ResourceDefinition, ResourceLibrary};
use isru_logic::sequencer::TickEffect;
use isru_logic::state::{ConverterState, ConverterStatus};
use isru_logic::store::{InMemoryStore, ResourceStore, Tank};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Vessel data (same JSON a host would load) ───────────────────────────
const VESSELS_JSON: &str = include_str!("../../../data/vessels.json");

const SWEEP_SEED: u64 = 0x5EED;
const SWEEP_CASES: usize = 2000;

// ── Logging ─────────────────────────────────────────────────────────────

struct StdoutLogger;

impl log::Log for StdoutLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            println!("    [{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StdoutLogger = StdoutLogger;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Off
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }

    println!("=== ISRU Converter Harness ===\n");

    let mut results = Vec::new();

    // 1. Vessel data validation
    results.extend(validate_vessel_data(verbose));

    // 2. Reference scenarios
    results.extend(validate_scenarios(verbose));

    // 3. Electricity cap
    results.extend(validate_electricity_cap(verbose));

    // 4. Randomized resolver sweep
    results.extend(validate_resolver_sweep(verbose));

    // 5. Save/load time accounting
    results.extend(validate_persistence(verbose));

    // 6. Long-running vessels
    results.extend(validate_long_run(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_vessel_definitions() -> Result<Vec<VesselDefinition>, serde_json::Error> {
    serde_json::from_str(VESSELS_JSON)
}

fn resource(library: &ResourceLibrary, name: &str) -> ResourceDefinition {
    library
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("stock library is missing {}", name))
}

fn converter(rate: f64, inputs: &str, outputs: &str) -> ConverterConfig {
    let def = ConverterDefinition {
        converter_name: "Harness Converter".to_string(),
        conversion_rate: rate,
        input_resources: inputs.to_string(),
        output_resources: outputs.to_string(),
        ..ConverterDefinition::default()
    };
    ConverterConfig::from_definition(&def, &ResourceLibrary::stock())
}

fn enabled_state() -> ConverterState {
    ConverterState {
        enabled: true,
        ..ConverterState::default()
    }
}

// ── 1. Vessel Data ──────────────────────────────────────────────────────

fn validate_vessel_data(verbose: bool) -> Vec<TestResult> {
    println!("--- Vessel Data ---");
    let mut results = Vec::new();

    let vessels = match load_vessel_definitions() {
        Ok(v) => v,
        Err(e) => {
            results.push(TestResult {
                name: "vessels_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "vessels_not_empty".into(),
        passed: !vessels.is_empty(),
        detail: format!("{} vessels loaded", vessels.len()),
    });

    let library = ResourceLibrary::stock();
    let mut problems = Vec::new();
    let mut untanked = Vec::new();
    let mut part_count = 0;

    for vessel in &vessels {
        let tanked: Vec<&str> = vessel.tanks.iter().map(|t| t.resource.as_str()).collect();
        for part in &vessel.parts {
            part_count += 1;
            for e in validate_definition(&part.converter, &library) {
                problems.push(format!("{}/{}: {}", vessel.name, part.name, e));
            }
            let config = ConverterConfig::from_definition(&part.converter, &library);
            for r in config.inputs.iter().chain(config.outputs.iter()) {
                if !tanked.contains(&r.resource.name.as_str()) {
                    untanked.push(format!("{}/{}: {}", vessel.name, part.name, r.resource.name));
                }
            }
            if verbose {
                println!(
                    "  {} / {}: {} in, {} out",
                    vessel.name,
                    part.name,
                    config.inputs.len(),
                    config.outputs.len()
                );
            }
        }
    }

    results.push(TestResult {
        name: "vessels_definitions_valid".into(),
        passed: problems.is_empty(),
        detail: if problems.is_empty() {
            format!("all {} converter definitions valid", part_count)
        } else {
            problems.join("; ")
        },
    });

    results.push(TestResult {
        name: "vessels_resources_have_tanks".into(),
        passed: untanked.is_empty(),
        detail: if untanked.is_empty() {
            "every converter resource has storage".into()
        } else {
            format!("no tank for: {}", untanked.join(", "))
        },
    });

    let built: Vec<_> = vessels.iter().map(Vessel::from_definition).collect();
    let failures: Vec<String> = built
        .iter()
        .filter_map(|b| b.as_ref().err().map(|e| e.to_string()))
        .collect();
    results.push(TestResult {
        name: "vessels_build".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{} vessels built", built.len())
        } else {
            failures.join("; ")
        },
    });

    results
}

// ── 2. Reference Scenarios ──────────────────────────────────────────────

fn validate_scenarios(_verbose: bool) -> Vec<TestResult> {
    println!("--- Reference Scenarios ---");
    let mut results = Vec::new();
    let library = ResourceLibrary::stock();
    let ore = resource(&library, "Ore");
    let metals = resource(&library, "Metals");
    let ctx = TickContext::new(10.0);

    // Ample input: full rate
    let cfg = converter(2.0, "Ore 1", "Metals 1 false");
    let mut store = InMemoryStore::new()
        .with_tank(&ore, Tank::new(500.0, 500.0))
        .with_tank(&metals, Tank::unlimited(0.0));
    let r = resolve(&cfg, &enabled_state(), &ctx, &store);
    let report = apply(&cfg, r.amount(), &ctx, &mut store);
    results.push(TestResult {
        name: "scenario_full_rate".into(),
        passed: r == Resolution::Feasible(20.0)
            && store.amount(&ore) == 480.0
            && store.amount(&metals) == 20.0
            && report.is_clean(),
        detail: format!("resolved {:.3}, status {}", r.amount(), r.status()),
    });

    // Scarce input: reduced run
    let mut store = InMemoryStore::new()
        .with_tank(&ore, Tank::new(5.0, 500.0))
        .with_tank(&metals, Tank::unlimited(0.0));
    let r = resolve(&cfg, &enabled_state(), &ctx, &store);
    apply(&cfg, r.amount(), &ctx, &mut store);
    results.push(TestResult {
        name: "scenario_reduced_rate".into(),
        passed: r == Resolution::Feasible(5.0)
            && r.status() == ConverterStatus::Running
            && store.amount(&metals) == 5.0,
        detail: format!("resolved {:.3}, status {}", r.amount(), r.status()),
    });

    // No output space: blocked, no transfers
    let mut store = InMemoryStore::new()
        .with_tank(&ore, Tank::new(500.0, 500.0))
        .with_tank(&metals, Tank::new(0.0, 0.0));
    let r = resolve(&cfg, &enabled_state(), &ctx, &store);
    apply(&cfg, r.amount(), &ctx, &mut store);
    results.push(TestResult {
        name: "scenario_no_space".into(),
        passed: r.status().to_string() == "No space for more Metals"
            && store.transfer_count() == 0,
        detail: format!("status {}, {} transfers", r.status(), store.transfer_count()),
    });

    // Malformed input string
    let parsed = parse_input_ratios("ElectricCharge, abc", &library);
    results.push(TestResult {
        name: "scenario_malformed_inputs".into(),
        passed: parsed.ratios.is_empty() && parsed.rejected.len() == 1,
        detail: format!(
            "{} ratios, {} rejected groups",
            parsed.ratios.len(),
            parsed.rejected.len()
        ),
    });

    results
}

// ── 3. Electricity Cap ──────────────────────────────────────────────────

fn validate_electricity_cap(verbose: bool) -> Vec<TestResult> {
    println!("--- Electricity Cap ---");
    let mut results = Vec::new();
    let library = ResourceLibrary::stock();
    let ec = resource(&library, "ElectricCharge");
    let ore = resource(&library, "Ore");
    let cfg = converter(0.5, "ElectricCharge 30 Ore 1", "");

    let mut worst_overdraw: f64 = 0.0;
    for elapsed in [0.02, 0.5, 1.0, 10.0, 600.0, 21_600.0] {
        let ctx = TickContext::new(elapsed);
        let mut store = InMemoryStore::new()
            .with_tank(&ec, Tank::new(1.0e6, 1.0e6))
            .with_tank(&ore, Tank::new(1.0e6, 1.0e6));
        let amount = resolve(&cfg, &enabled_state(), &ctx, &store).amount();
        let report = apply(&cfg, amount, &ctx, &mut store);
        let drawn = report.moved("ElectricCharge", TransferDirection::Consumed);
        let bound = 30.0 * 0.5 * ctx.electricity_max_delta.max(ctx.frame_delta);
        worst_overdraw = worst_overdraw.max(drawn - bound);
        if verbose {
            println!(
                "  elapsed {:>8.2}s: amount {:>9.3}, EC drawn {:>7.3} (bound {:.3})",
                elapsed, amount, drawn, bound
            );
        }
    }
    results.push(TestResult {
        name: "electricity_draw_bounded".into(),
        passed: worst_overdraw <= 1e-9,
        detail: format!("worst overdraw {:.3e}", worst_overdraw),
    });

    // Boundary: desired == cap and a hair above give the same answer
    let cfg = converter(1.0, "ElectricCharge 4", "");
    let store = InMemoryStore::new().with_tank(&ec, Tank::new(2.0, 100.0));
    let at = resolve(&cfg, &enabled_state(), &TickContext::new(1.0), &store).amount();
    let above = resolve(&cfg, &enabled_state(), &TickContext::new(1.0 + 1e-9), &store).amount();
    results.push(TestResult {
        name: "electricity_boundary_consistent".into(),
        passed: (at - above).abs() < 1e-6,
        detail: format!("at cap {:.9}, above cap {:.9}", at, above),
    });

    results
}

// ── 4. Randomized Resolver Sweep ────────────────────────────────────────

struct SweepCase {
    config: ConverterConfig,
    store: InMemoryStore,
    ctx: TickContext,
}

fn random_case(rng: &mut StdRng, library: &ResourceLibrary, allow_electric: bool) -> SweepCase {
    // Distinct resources across both lists keep constraints independent.
    let mut pool: Vec<ResourceDefinition> = library
        .iter()
        .filter(|d| allow_electric || !d.is_electric())
        .cloned()
        .collect();
    let mut pick = |rng: &mut StdRng| pool.swap_remove(rng.gen_range(0..pool.len()));

    let input_count = rng.gen_range(0..=3);
    let output_count = rng.gen_range(0..=3);
    let mut store = InMemoryStore::new();

    let mut inputs = Vec::new();
    for _ in 0..input_count {
        let def = pick(rng);
        let capacity = rng.gen_range(1.0..1000.0);
        let fill = if rng.gen_bool(0.15) { 0.0 } else { rng.gen_range(0.0..1.0) };
        store.add_tank(&def, Tank::new(capacity * fill, capacity));
        inputs.push(ResourceRatio::new(def, rng.gen_range(0.01..5.0)));
    }

    let mut outputs = Vec::new();
    for _ in 0..output_count {
        let def = pick(rng);
        let capacity = if rng.gen_bool(0.1) { 0.0 } else { rng.gen_range(1.0..1000.0) };
        let fill = rng.gen_range(0.0..1.0);
        store.add_tank(&def, Tank::new(capacity * fill, capacity));
        outputs.push(
            ResourceRatio::new(def, rng.gen_range(0.01..5.0)).with_allow_extra(rng.gen_bool(0.3)),
        );
    }

    let config = ConverterConfig {
        name: "Sweep".to_string(),
        conversion_rate: rng.gen_range(0.01..10.0),
        inputs,
        outputs,
        always_on: true,
        requires_oxygen_atmo: false,
    };
    let ctx = TickContext::new(rng.gen_range(0.0..600.0));

    SweepCase { config, store, ctx }
}

fn validate_resolver_sweep(verbose: bool) -> Vec<TestResult> {
    println!("--- Resolver Sweep ---");
    let mut results = Vec::new();
    let library = ResourceLibrary::stock();
    let mut rng = StdRng::seed_from_u64(SWEEP_SEED);
    let state = ConverterState::new();

    let mut out_of_range = 0;
    let mut dirty_applies = 0;
    let mut extra_constrained = 0;
    let mut misnamed = 0;
    let mut overfilled = 0;
    let mut blocked = 0;
    let mut electric_over_cap = 0;

    for i in 0..SWEEP_CASES {
        let allow_electric = i % 2 == 0;
        let SweepCase {
            config,
            mut store,
            ctx,
        } = random_case(&mut rng, &library, allow_electric);
        let ideal = ctx.desired_amount(config.conversion_rate);
        let resolution = resolve(&config, &state, &ctx, &store);
        let amount = resolution.amount();

        if !(0.0..=ideal + 1e-9).contains(&amount) {
            out_of_range += 1;
        }

        // Dropping allow-extra outputs must not change the answer.
        let mut without_extra = config.clone();
        without_extra.outputs.retain(|o| !o.allow_extra);
        if resolve(&without_extra, &state, &ctx, &store) != resolution {
            extra_constrained += 1;
        }

        if let Resolution::Blocked(status) = &resolution {
            blocked += 1;
            let named = match status {
                ConverterStatus::NoSpaceFor(n) => config
                    .outputs
                    .iter()
                    .any(|o| !o.allow_extra && &o.resource.name == n),
                ConverterStatus::NotEnough(n) => {
                    config.inputs.iter().any(|o| &o.resource.name == n)
                }
                _ => false,
            };
            if !named {
                misnamed += 1;
            }
        }

        let report = apply(&config, amount, &ctx, &mut store);
        let electric_bound = config.conversion_rate * ctx.electricity_max_delta.max(ctx.frame_delta);
        for (ratio, direction) in config
            .inputs
            .iter()
            .map(|r| (r, TransferDirection::Consumed))
            .chain(config.outputs.iter().map(|r| (r, TransferDirection::Produced)))
            .filter(|(r, _)| r.resource.is_electric())
        {
            if report.moved(&ratio.resource.name, direction) > electric_bound * ratio.ratio + 1e-9 {
                electric_over_cap += 1;
            }
        }
        // Electric shortfalls scale the whole run but still request the full
        // capped draw; only bulk-only converters must apply cleanly.
        let has_electric = config
            .inputs
            .iter()
            .chain(config.outputs.iter())
            .any(|r| r.resource.is_electric());
        if !has_electric && !report.is_clean() {
            dirty_applies += 1;
        }

        for (_, tank) in store.tanks() {
            if tank.amount < -1e-9 || tank.amount > tank.capacity + 1e-9 {
                overfilled += 1;
            }
        }
    }

    if verbose {
        println!(
            "  {} cases, {} blocked, seed {:#x}",
            SWEEP_CASES, blocked, SWEEP_SEED
        );
    }

    results.push(TestResult {
        name: "sweep_amount_within_ideal".into(),
        passed: out_of_range == 0,
        detail: format!("{} of {} out of [0, ideal]", out_of_range, SWEEP_CASES),
    });
    results.push(TestResult {
        name: "sweep_allow_extra_never_constrains".into(),
        passed: extra_constrained == 0,
        detail: format!("{} cases changed by allow-extra outputs", extra_constrained),
    });
    results.push(TestResult {
        name: "sweep_blocked_status_names_resource".into(),
        passed: misnamed == 0,
        detail: format!("{} of {} blocked cases misnamed", misnamed, blocked),
    });
    results.push(TestResult {
        name: "sweep_bulk_applies_clean".into(),
        passed: dirty_applies == 0,
        detail: format!("{} bulk-only applies with discrepancies", dirty_applies),
    });
    results.push(TestResult {
        name: "sweep_electricity_within_cap".into(),
        passed: electric_over_cap == 0,
        detail: format!("{} electric transfers above the per-tick cap", electric_over_cap),
    });
    results.push(TestResult {
        name: "sweep_tanks_within_bounds".into(),
        passed: overfilled == 0,
        detail: format!("{} tanks out of bounds after apply", overfilled),
    });

    // Zero free space on a capacity-limited output always blocks
    let ore = resource(&library, "Ore");
    let metals = resource(&library, "Metals");
    let full = InMemoryStore::new()
        .with_tank(&ore, Tank::new(100.0, 100.0))
        .with_tank(&metals, Tank::new(50.0, 50.0));
    let cfg = converter(1.0, "Ore 1", "Metals 1 false");
    let all_blocked = (1..=50).all(|s| {
        matches!(
            resolve(&cfg, &enabled_state(), &TickContext::new(s as f64), &full),
            Resolution::Blocked(ConverterStatus::NoSpaceFor(_))
        )
    });
    results.push(TestResult {
        name: "sweep_full_output_blocks".into(),
        passed: all_blocked && full.available_for(&metals, -1.0) == 0.0,
        detail: "full output tank blocks at every elapsed".into(),
    });

    results
}

// ── 5. Save/Load Time Accounting ────────────────────────────────────────

fn total_elapsed(ticks: &[PartTick], totals: &mut Vec<f64>) {
    totals.resize(ticks.len().max(totals.len()), 0.0);
    for (i, t) in ticks.iter().enumerate() {
        totals[i] += t.elapsed;
    }
}

fn validate_persistence(verbose: bool) -> Vec<TestResult> {
    println!("--- Save/Load ---");
    let mut results = Vec::new();

    let Ok(definitions) = load_vessel_definitions() else {
        return results;
    };

    for def in &definitions {
        let Ok(mut straight) = Vessel::from_definition(def) else {
            continue;
        };
        for _ in 0..20 {
            straight.update(0.5);
        }

        let mut buffer = Vec::new();
        let saved = straight.save(&mut buffer);
        let mut reloaded = Vessel::new("Reloaded");
        let loaded = saved.is_ok() && reloaded.load(&buffer[..]).is_ok();

        let mut a = Vec::new();
        let mut b = Vec::new();
        for _ in 0..40 {
            total_elapsed(&straight.update(0.5), &mut a);
            total_elapsed(&reloaded.update(0.5), &mut b);
        }
        let drift = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max);

        if verbose {
            println!(
                "  {}: {} bytes saved, elapsed drift {:.3e}",
                def.name,
                buffer.len(),
                drift
            );
        }

        results.push(TestResult {
            name: format!("persistence_{}", def.name.to_lowercase().replace(' ', "_")),
            passed: loaded && a.len() == b.len() && drift < 1e-9,
            detail: format!("{} parts, elapsed drift {:.3e}s", a.len(), drift),
        });
    }

    results
}

// ── 6. Long-Running Vessels ─────────────────────────────────────────────

fn validate_long_run(verbose: bool) -> Vec<TestResult> {
    println!("--- Long Run ---");
    let mut results = Vec::new();

    let Ok(definitions) = load_vessel_definitions() else {
        return results;
    };

    for def in &definitions {
        let Ok(mut vessel) = Vessel::from_definition(def) else {
            continue;
        };

        // One simulated hour at 1 Hz, then a six-hour jump.
        let mut converted_ticks = 0;
        for _ in 0..3600 {
            converted_ticks += vessel
                .update(1.0)
                .iter()
                .filter(|t| matches!(t.effect, TickEffect::Converted { .. }))
                .count();
        }
        let last = vessel.update(6.0 * 3600.0);

        let mut bad_tanks = Vec::new();
        for (id, tank) in vessel.store.tanks() {
            if tank.amount < -1e-9 || tank.amount > tank.capacity + 1e-9 {
                let name = vessel
                    .library
                    .by_id(*id)
                    .map(|d| d.name.clone())
                    .unwrap_or_default();
                bad_tanks.push(name);
            }
        }

        if verbose {
            for t in &last {
                let status = vessel
                    .status(t.entity)
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                println!("  {} / {}: {}", def.name, t.part, status);
            }
        }

        results.push(TestResult {
            name: format!("long_run_{}", def.name.to_lowercase().replace(' ', "_")),
            passed: bad_tanks.is_empty() && converted_ticks > 0,
            detail: if bad_tanks.is_empty() {
                format!("{} converting part-ticks, tanks in bounds", converted_ticks)
            } else {
                format!("tanks out of bounds: {}", bad_tanks.join(", "))
            },
        });
    }

    results
}
