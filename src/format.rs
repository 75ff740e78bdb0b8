/// Marker shown wherever a mean has no samples.
pub const UNDEFINED: &str = "—";

/// Integer with comma thousands separators: `14204` → `"14,204"`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn decimal2(value: f64) -> String {
    format!("{value:.2}")
}

pub fn optional_decimal2(value: Option<f64>) -> String {
    value.map(decimal2).unwrap_or_else(|| UNDEFINED.to_string())
}

/// Round for display; computations keep full precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
