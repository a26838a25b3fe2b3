//! Converter definitions and the parsed, read-only configuration.
//!
//! A [`ConverterDefinition`] is the raw part data as authored (strings and
//! flags, deserialized with serde). [`ConverterConfig::from_definition`]
//! resolves its resource strings against a [`ResourceLibrary`]; that parse
//! never fails. [`validate_definition`] reports everything questionable
//! about a definition without rejecting it.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONVERTER_NAME;
use crate::ratio::{parse_input_ratios, parse_output_ratios, RatioParse, ResourceRatio};
use crate::resources::ResourceLibrary;

/// Authored converter data, as found in part definition files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConverterDefinition {
    pub converter_name: String,
    /// Units of conversion per second.
    pub conversion_rate: f64,
    /// `<name> <ratio>` pairs.
    pub input_resources: String,
    /// `<name> <ratio> <allowExtra>` triples.
    pub output_resources: String,
    pub always_on: bool,
    pub requires_oxygen_atmo: bool,
}

impl Default for ConverterDefinition {
    fn default() -> Self {
        Self {
            converter_name: DEFAULT_CONVERTER_NAME.to_string(),
            conversion_rate: 1.0,
            input_resources: String::new(),
            output_resources: String::new(),
            always_on: false,
            requires_oxygen_atmo: false,
        }
    }
}

/// Parsed converter configuration. Treated as read-only by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    pub name: String,
    pub conversion_rate: f64,
    pub inputs: Vec<ResourceRatio>,
    pub outputs: Vec<ResourceRatio>,
    pub always_on: bool,
    pub requires_oxygen_atmo: bool,
}

impl ConverterConfig {
    /// Parse a definition. Unparseable resource groups are dropped (and
    /// logged); the rest of the definition is kept as authored.
    pub fn from_definition(definition: &ConverterDefinition, library: &ResourceLibrary) -> Self {
        let inputs = parse_input_ratios(&definition.input_resources, library);
        let outputs = parse_output_ratios(&definition.output_resources, library);
        Self {
            name: definition.converter_name.clone(),
            conversion_rate: definition.conversion_rate,
            inputs: inputs.ratios,
            outputs: outputs.ratios,
            always_on: definition.always_on,
            requires_oxygen_atmo: definition.requires_oxygen_atmo,
        }
    }
}

/// Something questionable about a converter definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Converter name is empty or whitespace.
    EmptyName,
    /// Conversion rate is NaN, infinite, or not positive.
    InvalidRate(f64),
    /// A group in the input string was skipped.
    RejectedInput(String),
    /// A group in the output string was skipped.
    RejectedOutput(String),
    /// Neither inputs nor outputs survived parsing.
    NoResources,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyName => write!(f, "converter name is empty"),
            ConfigError::InvalidRate(r) => write!(f, "invalid conversion rate {}", r),
            ConfigError::RejectedInput(g) => write!(f, "input group skipped: {}", g),
            ConfigError::RejectedOutput(g) => write!(f, "output group skipped: {}", g),
            ConfigError::NoResources => write!(f, "converter has no inputs or outputs"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn rejected_groups(parse: &RatioParse) -> impl Iterator<Item = String> + '_ {
    parse
        .rejected
        .iter()
        .map(|g| format!("[{}] ({})", g.tokens.join(" "), g.reason))
}

/// Validate a definition, returning all problems found.
pub fn validate_definition(
    definition: &ConverterDefinition,
    library: &ResourceLibrary,
) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if definition.converter_name.trim().is_empty() {
        errors.push(ConfigError::EmptyName);
    }
    if !definition.conversion_rate.is_finite() || definition.conversion_rate <= 0.0 {
        errors.push(ConfigError::InvalidRate(definition.conversion_rate));
    }

    let inputs = parse_input_ratios(&definition.input_resources, library);
    let outputs = parse_output_ratios(&definition.output_resources, library);
    errors.extend(rejected_groups(&inputs).map(ConfigError::RejectedInput));
    errors.extend(rejected_groups(&outputs).map(ConfigError::RejectedOutput));

    if inputs.ratios.is_empty() && outputs.ratios.is_empty() {
        errors.push(ConfigError::NoResources);
    }

    errors
}
