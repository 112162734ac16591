//! Number representation, rendering, and text-to-number helpers

use std::fmt;

/// A JSON number with both floating and 32-bit integer projections
///
/// The integer projection is only meaningful when [`Number::is_integral`]
/// holds, i.e. the floating value round-trips through it without loss.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Number {
    value: f64,
    int: i32,
}

impl Number {
    /// Create a number; the integer projection saturates at the `i32` range
    pub fn new(value: f64) -> Self {
        Self {
            value,
            int: value as i32,
        }
    }

    /// Floating-point value
    pub fn as_f64(&self) -> f64 {
        self.value
    }

    /// Integer projection (truncated toward zero, saturating)
    pub fn as_i32(&self) -> i32 {
        self.int
    }

    /// Check if the value renders as a plain 32-bit integer
    pub fn is_integral(&self) -> bool {
        ((self.int as f64) - self.value).abs() <= f64::EPSILON
            && self.value <= i32::MAX as f64
            && self.value >= i32::MIN as f64
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::new(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::new(value as f64)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.value;
        if !d.is_finite() {
            // NaN and infinities have no JSON spelling
            return f.write_str("null");
        }
        if self.is_integral() {
            return write!(f, "{}", self.int);
        }
        if (d.floor() - d).abs() <= f64::EPSILON {
            write!(f, "{:.0}", d)
        } else if d.abs() < 1.0e-6 || d.abs() >= 1.0e9 {
            write_exponent(f, d)
        } else {
            write!(f, "{:.6}", d)
        }
    }
}

/// `printf("%e")` layout: six fraction digits, signed two-digit exponent
fn write_exponent(f: &mut fmt::Formatter<'_>, d: f64) -> fmt::Result {
    let text = format!("{:.6e}", d);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
        }
        None => f.write_str(&text),
    }
}

/// Parse a decimal integer, saturating at `i64::MIN`/`i64::MAX`
///
/// Leading whitespace and a sign are accepted; parsing stops at the first
/// non-digit. Returns `None` when no digits are present.
pub fn parse_i64(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    let mut overflow = false;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        let digit = i64::from(byte - b'0');
        let next = value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) });
        match next {
            Some(v) => value = v,
            None => {
                overflow = true;
                break;
            }
        }
    }

    if !seen {
        return None;
    }
    if overflow {
        return Some(if negative { i64::MIN } else { i64::MAX });
    }
    Some(value)
}

/// Parse a floating-point number from the whole (whitespace-trimmed) text
pub fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse().ok()
}

#[cfg(test)]
#[path = "number/number_tests.rs"]
mod number_tests;
