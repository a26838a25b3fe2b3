//! ISRU Core - Vessel Converter Engine
//!
//! Hosts any number of resource converters on a vessel that shares one
//! resource pool, and drives them once per simulation step.
//!
//! # Architecture
//!
//! The engine uses an Entity Component System (ECS) via `hecs`:
//! - **Entities**: Converter parts
//! - **Components**: [`components::PartName`], [`components::ConverterModule`],
//!   and the runtime [`isru_logic::state::ConverterState`]
//! - **Systems**: [`engine::Vessel::update`] runs the pure per-tick step from
//!   `isru-logic` for every part, in the order parts were added
//!
//! # Example
//!
//! ```rust,no_run
//! use isru_core::prelude::*;
//!
//! let json = std::fs::read_to_string("data/vessels.json").unwrap();
//! let mut vessel = Vessel::from_json(&json).unwrap();
//!
//! loop {
//!     vessel.update(0.02); // 50 Hz fixed step
//! }
//! ```

pub mod components;
pub mod definition;
pub mod engine;
pub mod persistence;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::definition::{PartDefinition, TankDefinition, VesselDefinition};
    pub use crate::engine::{PartTick, Vessel, VesselError};
}
