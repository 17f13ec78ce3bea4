//! Numeric normalization helpers for instrument output.
//!
//! Some Lymphotrack and V-QUEST exports use a comma as the decimal separator.
//! Every float that reaches the classifier must pass through
//! [`parse_decimal`]; a stray comma here would corrupt every downstream
//! mutation-status call.

/// Trim whitespace and replace a decimal comma with a dot.
pub fn normalize_decimal(raw: &str) -> String {
    raw.trim().replace(',', ".")
}

/// Parse a decimal value that may use a comma separator.
pub fn parse_decimal(raw: &str) -> Result<f64, std::num::ParseFloatError> {
    normalize_decimal(raw).parse::<f64>()
}

/// Round to two decimal places, the precision used for V-REGION identity
/// throughout classification and report text.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Format a (two-decimal rounded) identity for the report text.
///
/// Whole numbers keep one decimal ("98.0"), a trailing zero in the second
/// decimal is dropped ("97.50" -> "97.5"), everything else keeps two
/// decimals ("97.55").
pub fn format_identity(v: f64) -> String {
    let s = format!("{:.2}", round2(v));
    let trimmed = s.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_normalization() {
        assert_eq!(normalize_decimal(" 97,5 "), "97.5");
        assert_eq!(normalize_decimal("98.2"), "98.2");
        assert_eq!(parse_decimal("97,55").unwrap(), 97.55);
        assert_eq!(parse_decimal("100").unwrap(), 100.0);
        assert!(parse_decimal("n/a").is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(97.555), 97.56);
        assert_eq!(round2(97.554), 97.55);
        assert_eq!(round2(98.0), 98.0);
    }

    #[test]
    fn test_format_identity() {
        assert_eq!(format_identity(98.0), "98.0");
        assert_eq!(format_identity(97.5), "97.5");
        assert_eq!(format_identity(97.55), "97.55");
        assert_eq!(format_identity(97.504), "97.5");
        assert_eq!(format_identity(100.0), "100.0");
    }
}
