//! Parsing of declarative attribute values.

/// Parses a boolean attribute.
///
/// A present-but-empty value means true. Unknown spellings keep `fallback`.
pub fn parse_flag(value: Option<&str>, fallback: bool) -> bool {
    let Some(value) = value else {
        return fallback;
    };
    match value.trim().to_lowercase().as_str() {
        "" | "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => fallback,
    }
}

/// Parses a finite number, falling back when missing or malformed.
pub fn parse_number(value: Option<&str>, fallback: f64) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(fallback)
}

/// Parses a surface dimension; non-positive or malformed values fall back.
pub fn parse_dimension(value: Option<&str>, fallback: u32) -> u32 {
    let n = parse_number(value, f64::NAN);
    if n.is_finite() && n >= 1.0 {
        n.round().min(u32::MAX as f64) as u32
    } else {
        fallback
    }
}

/// Parses a `brush-size` value into surface pixels.
///
/// Accepts `<n>`, `<n>px` and `<n>%` (percent of the smaller surface
/// dimension). Results are clamped to zero; malformed input keeps `fallback`.
pub fn parse_brush_size(value: Option<&str>, width: u32, height: u32, fallback: f64) -> f64 {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return fallback;
    };

    if let Some(percent) = value.strip_suffix('%') {
        return match percent.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => {
                let basis = width.min(height) as f64;
                (basis * n / 100.0).max(0.0)
            }
            _ => fallback,
        };
    }

    let px = value.strip_suffix("px").unwrap_or(value).trim();
    match px.parse::<f64>() {
        Ok(n) if n.is_finite() => n.max(0.0),
        _ => fallback,
    }
}
