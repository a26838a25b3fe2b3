//! Vessel engine - owns converter parts and the shared resource pool

use hecs::{Entity, World};
use isru_logic::controls::{self, ConverterControls};
use isru_logic::converter::ConverterDefinition;
use isru_logic::info::converter_info;
use isru_logic::resources::ResourceLibrary;
use isru_logic::sequencer::{tick, ConverterLimits, HostFrame, TickEffect};
use isru_logic::state::{ConverterState, ConverterStatus};
use isru_logic::store::{InMemoryStore, Tank};

use crate::components::{ConverterModule, PartName};
use crate::definition::VesselDefinition;

/// What one part did during an [`Vessel::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct PartTick {
    pub entity: Entity,
    pub part: String,
    pub effect: TickEffect,
    pub elapsed: f64,
}

/// A vessel: converter parts sharing one resource pool.
pub struct Vessel {
    pub name: String,
    /// ECS world containing all converter parts
    pub world: World,
    /// Vessel-wide resource pool
    pub store: InMemoryStore,
    /// Resources converter strings are resolved against
    pub library: ResourceLibrary,
    pub limits: ConverterLimits,
    pub atmosphere_has_oxygen: bool,
    /// Simulation time in seconds
    pub(crate) sim_time: f64,
    /// Seconds since creation or the last load
    pub(crate) time_since_load: f64,
    /// Parts in tick order
    pub(crate) parts: Vec<Entity>,
}

impl Vessel {
    /// Create an empty vessel with the stock resource library
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_library(name, ResourceLibrary::stock())
    }

    pub fn with_library(name: impl Into<String>, library: ResourceLibrary) -> Self {
        Self {
            name: name.into(),
            world: World::new(),
            store: InMemoryStore::new(),
            library,
            limits: ConverterLimits::default(),
            atmosphere_has_oxygen: true,
            sim_time: 0.0,
            time_since_load: 0.0,
            parts: Vec::new(),
        }
    }

    /// Build a vessel from a definition, using the stock library
    pub fn from_definition(definition: &VesselDefinition) -> Result<Self, VesselError> {
        let mut vessel = Self::new(definition.name.clone());
        vessel.atmosphere_has_oxygen = definition.atmosphere_has_oxygen;

        for tank in &definition.tanks {
            let capacity = tank.capacity.unwrap_or(f64::INFINITY);
            vessel.add_tank(&tank.resource, Tank::new(tank.amount, capacity))?;
        }
        for part in &definition.parts {
            let entity = vessel.add_converter(part.name.clone(), part.converter.clone());
            vessel.set_enabled(entity, part.enabled)?;
        }

        Ok(vessel)
    }

    /// Parse a JSON vessel definition and build it
    pub fn from_json(json: &str) -> Result<Self, VesselError> {
        let definition: VesselDefinition = serde_json::from_str(json)?;
        Self::from_definition(&definition)
    }

    /// Add storage for a named resource
    pub fn add_tank(&mut self, resource: &str, tank: Tank) -> Result<(), VesselError> {
        let definition = self
            .library
            .get(resource)
            .ok_or_else(|| VesselError::UnknownResource(resource.to_string()))?;
        self.store.add_tank(definition, tank);
        Ok(())
    }

    /// Install a converter part. Unparseable resource groups are dropped.
    pub fn add_converter(
        &mut self,
        part_name: impl Into<String>,
        definition: ConverterDefinition,
    ) -> Entity {
        let part_name = part_name.into();
        let module = ConverterModule::new(definition, &self.library);
        log::info!(
            "{}: installed {} ({} inputs, {} outputs)",
            part_name,
            module.config.name,
            module.config.inputs.len(),
            module.config.outputs.len()
        );
        self.spawn_part(part_name, module, ConverterState::new())
    }

    pub(crate) fn spawn_part(
        &mut self,
        part_name: String,
        module: ConverterModule,
        state: ConverterState,
    ) -> Entity {
        let entity = self.world.spawn((PartName(part_name), module, state));
        self.parts.push(entity);
        entity
    }

    /// Advance the simulation by `delta_seconds` and tick every converter
    pub fn update(&mut self, delta_seconds: f64) -> Vec<PartTick> {
        let delta = delta_seconds.max(0.0);
        self.sim_time += delta;
        self.time_since_load += delta;

        let frame = HostFrame {
            now: self.sim_time,
            frame_delta: delta,
            time_since_load: self.time_since_load,
            ready: true,
            atmosphere_has_oxygen: self.atmosphere_has_oxygen,
        };

        let mut ticks = Vec::with_capacity(self.parts.len());
        for &entity in &self.parts {
            let Ok((name, module, state)) = self
                .world
                .query_one_mut::<(&PartName, &ConverterModule, &mut ConverterState)>(entity)
            else {
                continue;
            };

            let outcome = tick(&module.config, state, &frame, &self.limits, &mut self.store);
            if outcome.state.status != state.status {
                log::info!("{}: {} -> {}", name.0, state.status, outcome.state.status);
            }
            *state = outcome.state;

            ticks.push(PartTick {
                entity,
                part: name.0.clone(),
                effect: outcome.effect,
                elapsed: outcome.elapsed,
            });
        }
        ticks
    }

    /// Turn a converter on or off (always-on converters ignore this)
    pub fn set_enabled(&mut self, entity: Entity, enabled: bool) -> Result<(), VesselError> {
        let (module, state) = self
            .world
            .query_one_mut::<(&ConverterModule, &mut ConverterState)>(entity)
            .map_err(|_| VesselError::UnknownPart)?;
        controls::set_enabled(&module.config, state, enabled);
        Ok(())
    }

    pub fn toggle(&mut self, entity: Entity) -> Result<(), VesselError> {
        let (module, state) = self
            .world
            .query_one_mut::<(&ConverterModule, &mut ConverterState)>(entity)
            .map_err(|_| VesselError::UnknownPart)?;
        controls::toggle(&module.config, state);
        Ok(())
    }

    /// Current status of a converter
    pub fn status(&self, entity: Entity) -> Result<ConverterStatus, VesselError> {
        let state = self
            .world
            .get::<&ConverterState>(entity)
            .map_err(|_| VesselError::UnknownPart)?;
        Ok(state.status.clone())
    }

    /// Effective enabled flag of a converter
    pub fn is_enabled(&self, entity: Entity) -> Result<bool, VesselError> {
        let module = self
            .world
            .get::<&ConverterModule>(entity)
            .map_err(|_| VesselError::UnknownPart)?;
        let state = self
            .world
            .get::<&ConverterState>(entity)
            .map_err(|_| VesselError::UnknownPart)?;
        Ok(state.is_enabled(&module.config))
    }

    /// Rate summary for the part info panel
    pub fn info(&self, entity: Entity) -> Result<String, VesselError> {
        let module = self
            .world
            .get::<&ConverterModule>(entity)
            .map_err(|_| VesselError::UnknownPart)?;
        Ok(converter_info(&module.config))
    }

    pub fn controls(&self, entity: Entity) -> Result<ConverterControls, VesselError> {
        let module = self
            .world
            .get::<&ConverterModule>(entity)
            .map_err(|_| VesselError::UnknownPart)?;
        let state = self
            .world
            .get::<&ConverterState>(entity)
            .map_err(|_| VesselError::UnknownPart)?;
        Ok(controls::controls(&module.config, &state))
    }

    /// Find a part by name
    pub fn part(&self, part_name: &str) -> Option<Entity> {
        self.parts.iter().copied().find(|&e| {
            self.world
                .get::<&PartName>(e)
                .map(|n| n.0 == part_name)
                .unwrap_or(false)
        })
    }

    /// Parts in tick order
    pub fn parts(&self) -> &[Entity] {
        &self.parts
    }

    /// Stock of a named resource (None if the name is unknown)
    pub fn amount(&self, resource: &str) -> Option<f64> {
        self.library.get(resource).map(|d| self.store.amount(d))
    }

    /// Get current simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Save vessel state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_vessel(writer, self)
    }

    /// Load vessel state from a reader, replacing this vessel
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), crate::persistence::SaveError> {
        *self = crate::persistence::load_vessel(reader)?;
        Ok(())
    }
}

/// Errors from building or controlling a vessel
#[derive(Debug)]
pub enum VesselError {
    Json(serde_json::Error),
    UnknownResource(String),
    UnknownPart,
}

impl From<serde_json::Error> for VesselError {
    fn from(e: serde_json::Error) -> Self {
        VesselError::Json(e)
    }
}

impl std::fmt::Display for VesselError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VesselError::Json(e) => write!(f, "Definition error: {}", e),
            VesselError::UnknownResource(name) => write!(f, "Unknown resource: {}", name),
            VesselError::UnknownPart => write!(f, "No converter part with that entity"),
        }
    }
}

impl std::error::Error for VesselError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn drill() -> ConverterDefinition {
        ConverterDefinition {
            converter_name: "Drill".to_string(),
            conversion_rate: 1.0,
            input_resources: "ElectricCharge 2".to_string(),
            output_resources: "Ore 1 false".to_string(),
            ..ConverterDefinition::default()
        }
    }

    fn mining_vessel() -> (Vessel, Entity) {
        let mut vessel = Vessel::new("Miner");
        vessel.add_tank("ElectricCharge", Tank::new(1000.0, 1000.0)).unwrap();
        vessel.add_tank("Ore", Tank::new(0.0, 100.0)).unwrap();
        let drill = vessel.add_converter("Drill Pod", drill());
        vessel.set_enabled(drill, true).unwrap();
        (vessel, drill)
    }

    #[test]
    fn test_vessel_creation() {
        let vessel = Vessel::new("Empty");
        assert!(vessel.parts().is_empty());
        assert_eq!(vessel.sim_time(), 0.0);
    }

    #[test]
    fn test_unknown_tank_resource() {
        let mut vessel = Vessel::new("Empty");
        let err = vessel.add_tank("Unobtainium", Tank::unlimited(0.0));
        assert!(matches!(err, Err(VesselError::UnknownResource(_))));
    }

    #[test]
    fn test_waits_then_primes_then_runs() {
        let (mut vessel, drill) = mining_vessel();

        // First second after load: host gate.
        let ticks = vessel.update(0.5);
        assert_eq!(ticks[0].effect, TickEffect::Waiting);

        let ticks = vessel.update(0.5);
        assert_eq!(ticks[0].effect, TickEffect::Primed);

        vessel.update(2.0);
        assert_eq!(vessel.status(drill).unwrap(), ConverterStatus::Running);
        assert!((vessel.amount("Ore").unwrap() - 2.0).abs() < 1e-9);
        assert!((vessel.amount("ElectricCharge").unwrap() - 996.0).abs() < 1e-9);
    }

    #[test]
    fn test_ore_tank_fills_and_blocks() {
        let (mut vessel, drill) = mining_vessel();
        vessel.update(1.0);
        for _ in 0..200 {
            vessel.update(1.0);
        }
        assert_eq!(vessel.amount("Ore"), Some(100.0));
        assert_eq!(
            vessel.status(drill).unwrap().to_string(),
            "No space for more Ore"
        );
    }

    #[test]
    fn test_disable_stops_conversion() {
        let (mut vessel, drill) = mining_vessel();
        vessel.update(1.0);
        vessel.toggle(drill).unwrap();
        assert!(!vessel.is_enabled(drill).unwrap());
        vessel.update(5.0);
        assert_eq!(vessel.amount("Ore"), Some(0.0));
        assert_eq!(vessel.status(drill).unwrap(), ConverterStatus::Inactive);
        assert!(vessel.controls(drill).unwrap().show_activate);
    }

    #[test]
    fn test_oxygen_atmosphere_gate() {
        let mut vessel = Vessel::new("Jet");
        vessel.add_tank("Oxidizer", Tank::unlimited(0.0)).unwrap();
        let intake = vessel.add_converter(
            "Intake",
            ConverterDefinition {
                converter_name: "Air Intake".to_string(),
                output_resources: "Oxidizer 1 false".to_string(),
                requires_oxygen_atmo: true,
                always_on: true,
                ..ConverterDefinition::default()
            },
        );
        vessel.atmosphere_has_oxygen = false;
        vessel.update(1.0);
        vessel.update(1.0);
        assert_eq!(vessel.status(intake).unwrap(), ConverterStatus::AtmoLacksOxygen);
        assert!(vessel.info(intake).unwrap().contains("Cannot be turned off."));
    }

    #[test]
    fn test_parts_tick_in_insertion_order() {
        // Two converters compete for 3 Ore; the first installed wins.
        let mut vessel = Vessel::new("Refinery");
        vessel.add_tank("Ore", Tank::new(3.0, 3.0)).unwrap();
        vessel.add_tank("Metals", Tank::unlimited(0.0)).unwrap();
        let smelter = ConverterDefinition {
            converter_name: "Smelter".to_string(),
            conversion_rate: 1.0,
            input_resources: "Ore 1".to_string(),
            output_resources: "Metals 1 false".to_string(),
            always_on: true,
            ..ConverterDefinition::default()
        };
        let first = vessel.add_converter("Smelter A", smelter.clone());
        let second = vessel.add_converter("Smelter B", smelter);
        vessel.update(1.0);
        vessel.update(5.0);
        assert_eq!(vessel.status(first).unwrap(), ConverterStatus::Running);
        assert_eq!(
            vessel.status(second).unwrap(),
            ConverterStatus::NotEnough("Ore".into())
        );
        assert_eq!(vessel.part("Smelter B"), Some(second));
    }
}
