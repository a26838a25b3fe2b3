//! Human-readable converter summary for part info panels.

use crate::converter::ConverterConfig;
use crate::ratio::ResourceRatio;

/// Format a value with an SI prefix (p, n, µ, m, k, M, G) and a fixed number
/// of decimals.
///
/// ```
/// use isru_logic::info::format_value;
///
/// assert_eq!(format_value(2.5, 3), "2.500");
/// assert_eq!(format_value(1500.0, 1), "1.5k");
/// assert_eq!(format_value(0.25, 3), "250.000m");
/// ```
pub fn format_value(value: f64, decimals: usize) -> String {
    let (sign, magnitude) = if value < 0.0 { ("-", -value) } else { ("", value) };

    let (scaled, prefix) = if magnitude == 0.0 || !magnitude.is_finite() {
        (magnitude, "")
    } else if magnitude >= 1e9 {
        (magnitude / 1e9, "G")
    } else if magnitude >= 1e6 {
        (magnitude / 1e6, "M")
    } else if magnitude >= 1e3 {
        (magnitude / 1e3, "k")
    } else if magnitude >= 1.0 {
        (magnitude, "")
    } else if magnitude >= 1e-3 {
        (magnitude * 1e3, "m")
    } else if magnitude >= 1e-6 {
        (magnitude * 1e6, "µ")
    } else if magnitude >= 1e-9 {
        (magnitude * 1e9, "n")
    } else {
        (magnitude * 1e12, "p")
    };

    format!("{}{:.*}{}", sign, decimals, scaled, prefix)
}

fn push_rates(out: &mut String, ratios: &[ResourceRatio], rate: f64) {
    for r in ratios {
        out.push_str("\n - ");
        out.push_str(&r.resource.name);
        out.push_str(": ");
        out.push_str(&format_value(r.ratio * rate, 3));
        out.push_str("U/sec");
    }
}

/// Multi-line summary: name, per-second input and output rates, and notes
/// for the oxygen requirement and always-on flag.
pub fn converter_info(config: &ConverterConfig) -> String {
    let mut out = String::new();
    out.push_str(&config.name);
    out.push_str("\n\nInputs:");
    push_rates(&mut out, &config.inputs, config.conversion_rate);
    out.push_str("\n\nOutputs: ");
    push_rates(&mut out, &config.outputs, config.conversion_rate);
    out.push('\n');
    if config.requires_oxygen_atmo {
        out.push_str("\nRequires an atmosphere containing Oxygen.");
    }
    if config.always_on {
        out.push_str("\nCannot be turned off.");
    }
    out
}
