//! Human-readable lengths and tool names.

use crate::config::{DEFAULT_MAX_DENOMINATOR, FRACTION_TOLERANCE};
use crate::model::tool::{ToolParams, ToolType};
use crate::units::Units;

/// Significant digits used when printing lengths and angles in names.
const NAME_SIG_DIGITS: i32 = 6;

/// Express a value as a whole number and a binary fraction, e.g. `"1 1/8"`.
///
/// Denominators are powers of two up to `max_denominator`, since the others
/// look odd on a drill index. Returns `None` when no fraction is within
/// tolerance of the fractional part.
pub fn fractional_representation(value: f64, max_denominator: u32) -> Option<String> {
    let mut result = String::new();
    let mut remainder = value;

    let whole = value.floor();
    if whole > 0.0 {
        result.push_str(&format_significant(whole, NAME_SIG_DIGITS));
        result.push(' ');
        remainder -= whole;
    }

    let mut denominator: u32 = 2;
    while denominator <= max_denominator {
        let den = f64::from(denominator);
        let numerator = (remainder * den).round();
        if numerator >= 1.0
            && numerator < den
            && (remainder - numerator / den).abs() < FRACTION_TOLERANCE
        {
            result.push_str(&format!("{}/{}", numerator as u32, denominator));
            return Some(result);
        }
        denominator = denominator.checked_mul(2)?;
    }

    None
}

/// Name describing a tool's size and type, e.g. `"6 mm End Mill"` or
/// `"1/4 inch Drill Bit"`. Chamfering bits are named by their angle.
pub fn meaningful_name(params: &ToolParams, units: Units) -> String {
    if params.tool_type == ToolType::Chamfer {
        return format!(
            "{} degree Chamfering Bit",
            format_significant(params.cutting_edge_angle, NAME_SIG_DIGITS)
        );
    }

    let diameter = units.to_display(params.diameter);
    let size = match units {
        Units::Millimeters => format_significant(diameter, NAME_SIG_DIGITS),
        Units::Inches => fractional_representation(diameter, DEFAULT_MAX_DENOMINATOR)
            .unwrap_or_else(|| format_significant(diameter, NAME_SIG_DIGITS)),
    };

    format!("{} {} {}", size, units.suffix(), params.tool_type.label())
}

/// Format a number with at most `sig_digits` significant digits, dropping
/// trailing zeros.
pub fn format_significant(value: f64, sig_digits: i32) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }

    let abs_val = value.abs();
    let decimal_places = if abs_val >= 1.0 {
        let int_digits = abs_val.log10().floor() as i32 + 1;
        (sig_digits - int_digits).max(0) as usize
    } else {
        // Leading zeros after the point are not significant
        let leading_zeros = (-abs_val.log10().floor()) as i32 - 1;
        (sig_digits + leading_zeros.max(0)) as usize
    };

    let formatted = format!("{:.prec$}", value, prec = decimal_places);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };

    if trimmed.is_empty() || trimmed == "-" || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
