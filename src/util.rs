// Parsing and small numeric helpers.
//
// All the messy locale handling for the CSV exports lives here so the
// series builders can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Numeric convention of a CSV field.
///
/// The surveillance exports mix two conventions: the semicolon-delimited
/// files use Brazilian formatting (`.` thousands, `,` decimal) while the
/// human export writes plain dot decimals such as `4.1`. Each field declares
/// which convention applies instead of guessing from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// `.` is a thousands separator, `,` is the decimal separator.
    Brazilian,
    /// `.` is the decimal separator, `,` is a thousands separator.
    DotDecimal,
}

/// Parse a numeric cell under the given convention.
///
/// - Trims whitespace.
/// - Rejects cells containing alphabetic characters.
/// - Strips the convention's thousands separator and maps its decimal
///   separator to `.` before parsing as `f64`.
/// - Returns `None` for empty or unparseable input.
pub fn parse_number(s: &str, format: NumberFormat) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let cleaned = match format {
        NumberFormat::Brazilian => s.replace('.', "").replace(',', "."),
        NumberFormat::DotDecimal => s.replace(',', ""),
    };
    cleaned.parse::<f64>().ok()
}

/// Like [`parse_number`] but coerces missing or dirty cells to `0.0` so
/// downstream aggregation never has to branch on gaps.
pub fn parse_number_or_zero(s: &str, format: NumberFormat) -> f64 {
    parse_number(s, format).unwrap_or(0.0)
}

/// Parse a year cell as a bare integer.
///
/// No separators are tolerated; header labels and totals rows yield `None`,
/// which is what keeps them out of every series.
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// Arithmetic mean; `0` for an empty slice to avoid NaNs in KPI output.
pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Fixed-decimal rendering with thousands separators for console KPIs.
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative();
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut out = int_part
        .parse::<i64>()
        .unwrap_or(0)
        .to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    if neg {
        format!("-{}", out)
    } else {
        out
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for row counts in console diagnostics (e.g. `9,855 rows read`).
    n.to_formatted_string(&Locale::en)
}
