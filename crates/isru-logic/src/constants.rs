//! Shared constants: time clamps, tolerances, and stock resource names.

/// Longest elapsed time a single tick may convert (6 hours, in seconds).
///
/// Anything beyond this is worked off on later ticks instead of in one surge.
pub const MAX_DELTA_TIME: f64 = 21_600.0;

/// Longest stretch of buffered electricity a single tick may draw or fill.
pub const ELECTRICITY_MAX_DELTA_TIME: f64 = 1.0;

/// Host fixed step assumed when a caller does not supply one (50 Hz).
pub const DEFAULT_FRAME_DELTA: f64 = 0.02;

/// Seconds after a scene load before converters start ticking.
pub const MIN_TIME_SINCE_LOAD: f64 = 1.0;

/// Persisted form of a clock that was never primed.
pub const UNSET_TIMESTAMP: f64 = -1.0;

/// Resolved amounts at or below this are treated as zero.
pub const NEGLIGIBLE_AMOUNT: f64 = 0.000_000_001;

/// A transfer below this fraction of the desired amount is a discrepancy.
pub const TRANSFER_TOLERANCE: f64 = 0.999;

/// Characters that separate tokens in input/output resource strings.
pub const DELIMITERS: &[char] = &[' ', ',', '\t', ';'];

/// Fallback converter name when a definition omits one.
pub const DEFAULT_CONVERTER_NAME: &str = "Generic Converter";

/// Stock resource names as they appear in definition strings.
pub mod resource_names {
    pub const ELECTRIC_CHARGE: &str = "ElectricCharge";
    pub const OXYGEN: &str = "Oxygen";
    pub const CARBON_DIOXIDE: &str = "CarbonDioxide";
    pub const WATER: &str = "Water";
    pub const WASTE_WATER: &str = "WasteWater";
    pub const FOOD: &str = "Food";
    pub const WASTE: &str = "Waste";
    pub const LIQUID_FUEL: &str = "LiquidFuel";
    pub const OXIDIZER: &str = "Oxidizer";
    pub const MONO_PROPELLANT: &str = "MonoPropellant";
    pub const XENON_GAS: &str = "XenonGas";
    pub const ORE: &str = "Ore";
    pub const HYDROGEN: &str = "Hydrogen";
    pub const METHANE: &str = "Methane";
    pub const KARBONITE: &str = "Karbonite";
    pub const MINERALS: &str = "Minerals";
    pub const SUBSTRATE: &str = "Substrate";
    pub const FERTILIZER: &str = "Fertilizer";
    pub const MULCH: &str = "Mulch";
    pub const METALS: &str = "Metals";
    pub const MATERIAL_KITS: &str = "MaterialKits";

    /// Every bulk (non-electric) stock resource, in registration order.
    pub const BULK: &[&str] = &[
        OXYGEN,
        CARBON_DIOXIDE,
        WATER,
        WASTE_WATER,
        FOOD,
        WASTE,
        LIQUID_FUEL,
        OXIDIZER,
        MONO_PROPELLANT,
        XENON_GAS,
        ORE,
        HYDROGEN,
        METHANE,
        KARBONITE,
        MINERALS,
        SUBSTRATE,
        FERTILIZER,
        MULCH,
        METALS,
        MATERIAL_KITS,
    ];
}
