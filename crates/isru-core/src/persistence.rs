//! Save/Load functionality for persisting vessel state
//!
//! Uses bincode for binary serialization. Per converter only the enabled
//! flag and the last-update timestamp are runtime state; the authored
//! definition is saved alongside so the parsed config can be rebuilt.

use hecs::World;
use isru_logic::converter::ConverterDefinition;
use isru_logic::resources::ResourceLibrary;
use isru_logic::sequencer::ConverterLimits;
use isru_logic::state::ConverterState;
use isru_logic::store::InMemoryStore;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::{ConverterModule, PartName};
use crate::engine::Vessel;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 2;

/// Serializable snapshot of a vessel
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub name: String,
    /// Simulation time in seconds
    pub sim_time: f64,
    pub atmosphere_has_oxygen: bool,
    pub limits: ConverterLimits,
    pub library: ResourceLibrary,
    pub store: InMemoryStore,
    /// Converter parts in tick order
    pub parts: Vec<SavedPart>,
}

/// Persisted fields of one converter part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPart {
    pub name: String,
    pub definition: ConverterDefinition,
    pub enabled: bool,
    /// Negative when the clock was never primed
    pub last_update_time: f64,
}

/// Extract the converter parts of a vessel, in tick order
fn serialize_parts(world: &World, parts: &[hecs::Entity]) -> Vec<SavedPart> {
    let mut saved = Vec::with_capacity(parts.len());
    for &entity in parts {
        let Ok(mut query) =
            world.query_one::<(&PartName, &ConverterModule, &ConverterState)>(entity)
        else {
            continue;
        };
        if let Some((name, module, state)) = query.get() {
            saved.push(SavedPart {
                name: name.0.clone(),
                definition: module.definition.clone(),
                enabled: state.enabled,
                last_update_time: state.persisted_timestamp(),
            });
        }
    }
    saved
}

/// Save the complete vessel to a writer
pub fn save_vessel<W: Write>(writer: W, vessel: &Vessel) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        name: vessel.name.clone(),
        sim_time: vessel.sim_time,
        atmosphere_has_oxygen: vessel.atmosphere_has_oxygen,
        limits: vessel.limits,
        library: vessel.library.clone(),
        store: vessel.store.clone(),
        parts: serialize_parts(&vessel.world, &vessel.parts),
    };

    bincode::serialize_into(writer, &save_data)?;
    log::info!(
        "Saved {} ({} parts) at t={:.3}",
        save_data.name,
        save_data.parts.len(),
        save_data.sim_time
    );
    Ok(())
}

/// Load a vessel from a reader
///
/// The time-since-load gate restarts at zero, so converters wait for the
/// host to settle before their first post-load tick.
pub fn load_vessel<R: Read>(reader: R) -> Result<Vessel, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut vessel = Vessel::with_library(save_data.name, save_data.library);
    vessel.sim_time = save_data.sim_time;
    vessel.atmosphere_has_oxygen = save_data.atmosphere_has_oxygen;
    vessel.limits = save_data.limits;
    vessel.store = save_data.store;

    for part in save_data.parts {
        let module = ConverterModule::new(part.definition, &vessel.library);
        let mut state = ConverterState::restore(part.enabled, part.last_update_time);
        if !state.is_enabled(&module.config) {
            state.status = isru_logic::state::ConverterStatus::Inactive;
        }
        vessel.spawn_part(part.name, module, state);
    }

    log::info!(
        "Loaded {} ({} parts) at t={:.3}",
        vessel.name,
        vessel.parts().len(),
        vessel.sim_time
    );
    Ok(vessel)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
