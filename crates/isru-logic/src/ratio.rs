//! Resource ratios and the delimited string format they are configured in.
//!
//! Inputs are alternating `<name> <ratio>` pairs; outputs are alternating
//! `<name> <ratio> <allowExtra>` triples. Tokens are separated by any run of
//! space, comma, tab, or semicolon:
//!
//! ```
//! use isru_logic::ratio::{parse_input_ratios, parse_output_ratios};
//! use isru_logic::resources::ResourceLibrary;
//!
//! let lib = ResourceLibrary::stock();
//! let inputs = parse_input_ratios("Ore, 0.5; ElectricCharge, 30", &lib);
//! assert_eq!(inputs.ratios.len(), 2);
//!
//! let outputs = parse_output_ratios("LiquidFuel 0.45 false", &lib);
//! assert!(!outputs.ratios[0].allow_extra);
//! ```
//!
//! Parsing never fails. A group that cannot be understood is skipped with a
//! warning, and the remaining groups are still parsed.

use serde::{Deserialize, Serialize};

use crate::constants::DELIMITERS;
use crate::resources::{ResourceDefinition, ResourceLibrary};

/// A resource and its weight within an input or output list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRatio {
    pub resource: ResourceDefinition,
    /// Units of this resource per unit of conversion.
    pub ratio: f64,
    /// Outputs only: never throttle on capacity, discard the excess instead.
    pub allow_extra: bool,
}

impl ResourceRatio {
    pub fn new(resource: ResourceDefinition, ratio: f64) -> Self {
        Self {
            resource,
            ratio,
            allow_extra: false,
        }
    }

    pub fn with_allow_extra(mut self, allow_extra: bool) -> Self {
        self.allow_extra = allow_extra;
        self
    }
}

/// A token group the parser skipped, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedGroup {
    pub tokens: Vec<String>,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnknownResource,
    BadRatio,
    BadAllowExtra,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::UnknownResource => write!(f, "unknown resource"),
            RejectReason::BadRatio => write!(f, "ratio is not a positive number"),
            RejectReason::BadAllowExtra => write!(f, "allow-extra flag is not true/false"),
        }
    }
}

/// Outcome of parsing one resource string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatioParse {
    pub ratios: Vec<ResourceRatio>,
    pub rejected: Vec<RejectedGroup>,
}

impl RatioParse {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

fn tokenize(source: &str) -> Vec<&str> {
    source
        .split(DELIMITERS)
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_ratio(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r > 0.0)
}

fn parse_flag(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn reject(parse: &mut RatioParse, group: &[&str], reason: RejectReason, source: &str) {
    log::warn!(
        "Cannot parse \"{}\": skipping [{}] ({})",
        source,
        group.join(" "),
        reason
    );
    parse.rejected.push(RejectedGroup {
        tokens: group.iter().map(|t| t.to_string()).collect(),
        reason,
    });
}

fn log_parsed(kind: &str, parse: &RatioParse, source: &str) {
    let listed = parse
        .ratios
        .iter()
        .map(|r| format!("{}, {}", r.resource.name, r.ratio))
        .collect::<Vec<_>>()
        .join(", ");
    log::debug!("{} resources parsed: {} from \"{}\"", kind, listed, source);
}

/// Parse `<name> <ratio>` pairs. A trailing unpaired token is ignored.
pub fn parse_input_ratios(source: &str, library: &ResourceLibrary) -> RatioParse {
    let tokens = tokenize(source);
    let mut parse = RatioParse::default();

    for group in tokens.chunks_exact(2) {
        let Some(resource) = library.get(group[0]) else {
            reject(&mut parse, group, RejectReason::UnknownResource, source);
            continue;
        };
        let Some(ratio) = parse_ratio(group[1]) else {
            reject(&mut parse, group, RejectReason::BadRatio, source);
            continue;
        };
        parse.ratios.push(ResourceRatio::new(resource.clone(), ratio));
    }

    log_parsed("Input", &parse, source);
    parse
}

/// Parse `<name> <ratio> <allowExtra>` triples. Trailing tokens that do not
/// form a full triple are ignored.
pub fn parse_output_ratios(source: &str, library: &ResourceLibrary) -> RatioParse {
    let tokens = tokenize(source);
    let mut parse = RatioParse::default();

    for group in tokens.chunks_exact(3) {
        let Some(resource) = library.get(group[0]) else {
            reject(&mut parse, group, RejectReason::UnknownResource, source);
            continue;
        };
        let Some(ratio) = parse_ratio(group[1]) else {
            reject(&mut parse, group, RejectReason::BadRatio, source);
            continue;
        };
        let Some(allow_extra) = parse_flag(group[2]) else {
            reject(&mut parse, group, RejectReason::BadAllowExtra, source);
            continue;
        };
        parse
            .ratios
            .push(ResourceRatio::new(resource.clone(), ratio).with_allow_extra(allow_extra));
    }

    log_parsed("Output", &parse, source);
    parse
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib() -> ResourceLibrary {
        ResourceLibrary::stock()
    }

    fn names(parse: &RatioParse) -> Vec<&str> {
        parse.ratios.iter().map(|r| r.resource.name.as_str()).collect()
    }

    #[test]
    fn test_inputs_mixed_delimiters() {
        let p = parse_input_ratios("Ore,0.5;\tElectricCharge  30 ,, Water;0.1", &lib());
        assert!(p.is_clean());
        assert_eq!(names(&p), vec!["Ore", "ElectricCharge", "Water"]);
        assert_eq!(p.ratios[1].ratio, 30.0);
        assert!(p.ratios.iter().all(|r| !r.allow_extra));
    }

    #[test]
    fn test_input_bad_ratio_is_skipped() {
        let p = parse_input_ratios("ElectricCharge, abc", &lib());
        assert!(p.ratios.is_empty());
        assert_eq!(p.rejected.len(), 1);
        assert_eq!(p.rejected[0].reason, RejectReason::BadRatio);
    }

    #[test]
    fn test_input_unknown_resource_does_not_stop_parsing() {
        let p = parse_input_ratios("Unobtainium 1 Ore 2", &lib());
        assert_eq!(names(&p), vec!["Ore"]);
        assert_eq!(p.rejected[0].reason, RejectReason::UnknownResource);
    }

    #[test]
    fn test_input_trailing_token_ignored() {
        let p = parse_input_ratios("Ore 2 Water", &lib());
        assert_eq!(names(&p), vec!["Ore"]);
        assert!(p.is_clean());
    }

    #[test]
    fn test_non_positive_ratios_rejected() {
        let p = parse_input_ratios("Ore 0 Water -1 Food NaN Waste inf", &lib());
        assert!(p.ratios.is_empty());
        assert_eq!(p.rejected.len(), 4);
    }

    #[test]
    fn test_outputs_triples() {
        let p = parse_output_ratios("LiquidFuel, 0.45, false, Oxidizer, 0.55, True", &lib());
        assert!(p.is_clean());
        assert_eq!(names(&p), vec!["LiquidFuel", "Oxidizer"]);
        assert!(!p.ratios[0].allow_extra);
        assert!(p.ratios[1].allow_extra);
    }

    #[test]
    fn test_output_bad_flag_skipped() {
        let p = parse_output_ratios("Water 1 maybe Oxygen 2 false", &lib());
        assert_eq!(names(&p), vec!["Oxygen"]);
        assert_eq!(p.rejected[0].reason, RejectReason::BadAllowExtra);
    }

    #[test]
    fn test_empty_string_parses_to_nothing() {
        assert_eq!(parse_input_ratios("", &lib()), RatioParse::default());
        assert_eq!(parse_output_ratios(" ;, ", &lib()), RatioParse::default());
    }
}
