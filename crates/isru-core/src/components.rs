//! Components attached to converter part entities.

use isru_logic::converter::{ConverterConfig, ConverterDefinition};
use isru_logic::resources::ResourceLibrary;
use serde::{Deserialize, Serialize};

/// Display name of the part carrying a converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartName(pub String);

/// The converter module on a part: authored definition plus its parse.
///
/// The definition is kept so the config can be rebuilt after a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterModule {
    pub definition: ConverterDefinition,
    pub config: ConverterConfig,
}

impl ConverterModule {
    pub fn new(definition: ConverterDefinition, library: &ResourceLibrary) -> Self {
        let config = ConverterConfig::from_definition(&definition, library);
        Self { definition, config }
    }
}
