//! Vessel definitions loaded from JSON.
//!
//! ```json
//! {
//!   "name": "Mining Base",
//!   "atmosphereHasOxygen": false,
//!   "tanks": [ { "resource": "Ore", "amount": 0, "capacity": 1500 } ],
//!   "parts": [
//!     { "name": "Drill", "enabled": true,
//!       "converter": { "converterName": "Drill", "outputResources": "Ore 1 false" } }
//!   ]
//! }
//! ```
//!
//! A tank without `capacity` is unlimited.

use isru_logic::converter::ConverterDefinition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankDefinition {
    pub resource: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub capacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDefinition {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    pub converter: ConverterDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselDefinition {
    pub name: String,
    #[serde(default = "default_true")]
    pub atmosphere_has_oxygen: bool,
    #[serde(default)]
    pub tanks: Vec<TankDefinition>,
    #[serde(default)]
    pub parts: Vec<PartDefinition>,
}

fn default_true() -> bool {
    true
}
