//! An exact decimal number, as written in the source bytes.
//!
//! PDF real numbers (ISO 32000 §7.3.3) are decimal literals like `-3.50` or `.017`. Parsing
//! them into `f32`/`f64` loses information a round-tripping tool cares about (`10.10` and
//! `10.1` are distinct tokens but equal floats). `Decimal` keeps the sign, integer digits and
//! fractional digits separately instead, so equality matches the source text exactly.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    negative: bool,
    int_digits: String,
    frac_digits: String,
}

impl Decimal {
    /// Builds a `Decimal` from its already-separated parts. `int_digits` and `frac_digits` may
    /// each be empty (PDF allows `.017` and `10.`) but not both.
    pub(crate) fn new(negative: bool, int_digits: String, frac_digits: String) -> Self {
        debug_assert!(!int_digits.is_empty() || !frac_digits.is_empty());
        Decimal {
            negative,
            int_digits,
            frac_digits,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative && self.as_f64() != 0.0
    }

    /// Lossy conversion, for callers that only need an approximate numeric value.
    pub fn as_f64(&self) -> f64 {
        let int_part: f64 = if self.int_digits.is_empty() {
            0.0
        } else {
            self.int_digits.parse().unwrap_or(0.0)
        };
        let frac_part: f64 = if self.frac_digits.is_empty() {
            0.0
        } else {
            let numerator: f64 = self.frac_digits.parse().unwrap_or(0.0);
            numerator / 10f64.powi(self.frac_digits.len() as i32)
        };
        let magnitude = int_part + frac_part;
        if self.negative { -magnitude } else { magnitude }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", self.int_digits)?;
        if !self.frac_digits.is_empty() {
            write!(f, ".{}", self.frac_digits)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Decimal;

    #[test]
    fn distinguishes_trailing_zero_from_source() {
        let a = Decimal::new(false, "10".to_string(), "10".to_string());
        let b = Decimal::new(false, "10".to_string(), "1".to_string());
        assert_ne!(a, b);
        assert_eq!(a.as_f64(), b.as_f64());
    }

    #[test]
    fn leading_dot_and_trailing_dot() {
        let leading = Decimal::new(true, String::new(), "12".to_string());
        assert_eq!(leading.as_f64(), -0.12);
        let trailing = Decimal::new(false, "10".to_string(), String::new());
        assert_eq!(trailing.as_f64(), 10.0);
    }

    #[test]
    fn display_round_trips_digits() {
        let d = Decimal::new(true, "3".to_string(), "50".to_string());
        assert_eq!(d.to_string(), "-3.50");
    }
}
