//! Brazilian-locale numeric parsing and rendering.
//!
//! Margin values arrive as raw text whose decimal-separator convention is not
//! normalized: the table may use a period or a comma as the decimal point, or
//! period thousands separators with a comma decimal point.

/// Parse a raw margin text into a numeric value.
///
/// - both `.` and `,` present: `.` is a thousands separator, `,` the decimal
///   point (`"1.234,56"` -> 1234.56);
/// - only `,` present: `,` is the decimal point (`"12,5"` -> 12.5);
/// - otherwise parsed as-is (`"12.50"` -> 12.5).
///
/// Unparseable text yields 0.0: a missing margin contributes nothing to the
/// aggregate and is flagged on the audit trail instead of failing the run.
pub fn margin_value(text: &str) -> f64 {
    let normalized = if text.contains(',') && text.contains('.') {
        text.replace('.', "").replace(',', ".")
    } else if text.contains(',') {
        text.replace(',', ".")
    } else {
        text.to_string()
    };
    normalized.parse().unwrap_or(0.0)
}

/// Render a value in the Brazilian monetary convention: two decimal places,
/// `.` thousands separator, `,` decimal separator (`1234.5` -> `"1.234,50"`).
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped},{frac_part}")
}
