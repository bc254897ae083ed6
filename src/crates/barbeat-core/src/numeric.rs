//! Decimal and fraction text for beat offsets and durations.
//!
//! Values are written in whichever form is shortest while staying exact:
//! `1.25` stays decimal, `1 + 1/3` must be written `1+1/3`, and on a length
//! tie the fraction form wins (`1+1/8` rather than `1.125`).

use crate::error::{Error, Result};

/// Denominators tried, in order, when looking for a fraction form.
pub const FRACTION_DENOMINATORS: [u32; 7] = [2, 3, 4, 6, 8, 12, 16];

/// How close `num/den` must be to a fractional part to be accepted.
pub const FRACTION_TOLERANCE: f64 = 0.0005;

/// Slack allowed, after scaling by 1000, for a 3-place decimal to count as exact.
const DECIMAL_TOLERANCE: f64 = 0.01;

/// Which domain a number is being written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// Beat positions (always >= 1): fractions are written as mixed numbers.
    Position,
    /// Durations and steps: may be below 1 and use bare `n/d` or `/d`.
    Unsigned,
}

/// The text form picked for a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal,
    Fraction,
    /// Neither a 3-place decimal nor a known fraction is exact; the value is
    /// written with full precision.
    FullPrecision,
}

/// Find the first `(numerator, denominator)` within tolerance of `fract`.
pub fn find_fraction(fract: f64) -> Option<(u32, u32)> {
    for &den in FRACTION_DENOMINATORS.iter() {
        for num in 1..den {
            if (num as f64 / den as f64 - fract).abs() < FRACTION_TOLERANCE {
                return Some((num, den));
            }
        }
    }
    None
}

/// Whether rounding to 3 decimal places reproduces the value.
pub fn is_lossless_decimal(value: f64) -> bool {
    let scaled = value * 1000.0;
    (scaled.round() - scaled).abs() < DECIMAL_TOLERANCE
}

/// Render with at most 3 decimal places, trimming trailing zeros and a
/// dangling decimal point.
pub fn format_decimal(value: f64) -> String {
    let text = format!("{:.3}", value);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Pick between decimal and fraction text. Ties go to the fraction.
pub fn choose_style(decimal: Option<&str>, fraction: Option<&str>) -> NumberStyle {
    match (decimal, fraction) {
        (Some(d), Some(f)) if d.len() < f.len() => NumberStyle::Decimal,
        (_, Some(_)) => NumberStyle::Fraction,
        (Some(_), None) => NumberStyle::Decimal,
        (None, None) => NumberStyle::FullPrecision,
    }
}

fn render_fraction(whole: f64, num: u32, den: u32, mode: ValueMode) -> String {
    if whole >= 1.0 {
        format!("{}+{}/{}", whole, num, den)
    } else if num == 1 && mode == ValueMode::Unsigned {
        format!("/{}", den)
    } else {
        format!("{}/{}", num, den)
    }
}

/// Format a non-negative value for the given domain.
pub fn format_number(value: f64, mode: ValueMode) -> String {
    if value.fract() == 0.0 {
        return format!("{}", value);
    }

    let whole = value.trunc();
    let fraction =
        find_fraction(value - whole).map(|(num, den)| render_fraction(whole, num, den, mode));
    let decimal = is_lossless_decimal(value).then(|| format_decimal(value));

    match choose_style(decimal.as_deref(), fraction.as_deref()) {
        NumberStyle::Decimal => decimal.unwrap_or_else(|| format_decimal(value)),
        NumberStyle::Fraction => fraction.unwrap_or_else(|| format!("{}", value)),
        NumberStyle::FullPrecision => format!("{}", value),
    }
}

/// Format a beat position (>= 1).
pub fn format_position_beat(value: f64) -> String {
    format_number(value, ValueMode::Position)
}

/// Format a duration or repeat step.
pub fn format_unsigned(value: f64) -> String {
    format_number(value, ValueMode::Unsigned)
}

/// Decimal-only formatting, used where the grammar has no fraction form.
pub fn format_plain_decimal(value: f64) -> String {
    if is_lossless_decimal(value) {
        format_decimal(value)
    } else {
        format!("{}", value)
    }
}

fn parse_integer(part: &str, input: &str, what: &str) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::format(input, format!("{} is not a whole number", what)));
    }
    part.parse()
        .map_err(|_| Error::format(input, format!("{} is not a whole number", what)))
}

fn parse_fraction(part: &str, input: &str) -> Result<f64> {
    let (num_str, den_str) = part
        .split_once('/')
        .ok_or_else(|| Error::format(input, "expected a fraction like 1/3"))?;

    // `/d` is shorthand for `1/d`
    let num = if num_str.is_empty() {
        1
    } else {
        parse_integer(num_str, input, "numerator")?
    };
    let den = parse_integer(den_str, input, "denominator")?;

    if den == 0 {
        return Err(Error::division_by_zero(input));
    }

    Ok(num as f64 / den as f64)
}

fn parse_decimal(input: &str) -> Result<f64> {
    let mut dots = 0;
    let mut digits = 0;
    for b in input.bytes() {
        match b {
            b'.' => dots += 1,
            b'0'..=b'9' => digits += 1,
            _ => return Err(Error::format(input, "not a number")),
        }
    }
    if digits == 0 || dots > 1 {
        return Err(Error::format(input, "not a number"));
    }

    input
        .parse()
        .map_err(|_| Error::format(input, "not a number"))
}

/// Parse any number the formatter can produce: `3`, `2.5`, `3/4`, `/4`, `1+1/3`.
pub fn parse_number(input: &str) -> Result<f64> {
    if input.is_empty() {
        return Err(Error::format(input, "empty number"));
    }
    if input.starts_with('-') {
        return Err(Error::range(format!("value must not be negative, got {}", input)));
    }

    if let Some((whole, fraction)) = input.split_once('+') {
        let whole = parse_integer(whole, input, "whole part")?;
        if !fraction.contains('/') {
            return Err(Error::format(input, "mixed numbers are written like 1+1/3"));
        }
        return Ok(whole as f64 + parse_fraction(fraction, input)?);
    }

    if input.contains('/') {
        return parse_fraction(input, input);
    }

    parse_decimal(input)
}
