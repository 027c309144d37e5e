use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;

const SCALE: f64 = 1e10;
/// Magnitude from which results are written in scientific notation.
const SCIENTIFIC_FROM: f64 = 1e21;

/// Represents a result calculated by this library: the value as computed
/// and the value rounded to ten decimal places for display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value {
    raw: f64,
    rounded: f64,
}

impl Value {
    pub fn raw(&self) -> f64 {
        self.raw
    }

    /// The value rounded to ten decimal places.
    pub fn as_float(&self) -> f64 {
        self.rounded
    }
}

impl From<f64> for Value {
    fn from(raw: f64) -> Value {
        Value {
            raw,
            rounded: round(raw),
        }
    }
}

fn round(x: f64) -> f64 {
    // whole numbers are already exact; scaling them would only add noise
    if x.fract() == 0.0 {
        return if x == 0.0 { 0.0 } else { x };
    }
    let scaled = x * SCALE;
    if !scaled.is_finite() {
        return x;
    }
    let rounded = scaled.round() / SCALE;
    // no negative zero on the display
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let n = self.rounded;
        if n.abs() >= SCIENTIFIC_FROM {
            // 1e21 -> 1e+21, which the calculator reads back as a number
            let text = format!("{:e}", n);
            match text.find('e') {
                Some(pos) if !text[pos + 1..].starts_with('-') => {
                    write!(f, "{}e+{}", &text[..pos], &text[pos + 1..])
                }
                _ => f.write_str(&text),
            }
        } else {
            write!(f, "{}", n)
        }
    }
}

impl FromStr for Value {
    type Err = CalcError;

    /// Read back a formatted result. Text with at most ten decimals is
    /// already at display precision and is not rounded a second time.
    fn from_str(s: &str) -> Result<Value, CalcError> {
        let s = s.trim();
        let n: f64 = s.parse()?;
        if !n.is_finite() {
            return Err(CalcError::InvalidNumber(s.to_owned()));
        }
        let decimals = s
            .split(|c| c == 'e' || c == 'E')
            .next()
            .and_then(|mantissa| mantissa.split('.').nth(1))
            .map_or(0, str::len);
        if decimals <= 10 {
            Ok(Value {
                raw: n,
                rounded: if n == 0.0 { 0.0 } else { n },
            })
        } else {
            Ok(Value::from(n))
        }
    }
}
