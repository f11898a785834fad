//! Whole-cent currency amounts
//!
//! Arithmetic is done on an `i64` count of cents. On disk an amount is a
//! plain JSON number (`12.5`, `1200`), which is what restored backups contain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct Money(i64);

/// Largest magnitude `parse` and the JSON form accept: one trillion units
pub const MAX_CENTS: i64 = 100_000_000_000_000;

/// An amount that is not a plain decimal number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid amount")]
pub struct MoneyParseError(String);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse `"10.50"`, `"-10.50"`, `"+3"`, `"$10.50"` or `".5"`
    ///
    /// A third decimal digit of 5 or more rounds the cents away from zero;
    /// later digits are ignored. Magnitudes above [`MAX_CENTS`] are
    /// rejected. Thousands separators and accounting parentheses are the
    /// import normalizer's job.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let raw = s.trim();
        let invalid = || MoneyParseError(raw.to_string());

        let (sign, unsigned) = match raw.as_bytes().first() {
            Some(b'-') => (-1, &raw[1..]),
            Some(b'+') => (1, &raw[1..]),
            _ => (1, raw),
        };
        let number = unsigned.strip_prefix('$').unwrap_or(unsigned);
        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(invalid());
        }

        let units: i64 = match whole {
            "" => 0,
            digits => digits.parse().map_err(|_| invalid())?,
        };
        let frac_digit = |i: usize| frac.as_bytes().get(i).map_or(0, |b| i64::from(b - b'0'));
        let carry = i64::from(frac_digit(2) >= 5);

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_digit(0) * 10 + frac_digit(1) + carry))
            .filter(|cents| *cents <= MAX_CENTS)
            .map(|cents| Self(sign * cents))
            .ok_or_else(invalid)
    }

    /// `-$1,234.50` style, with any symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            group_thousands(cents / 100),
            cents % 100
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format_with_symbol("$"))
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.as_f64()
    }
}

impl TryFrom<f64> for Money {
    type Error = MoneyParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let cents = (value * 100.0).round();
        if cents.is_finite() && cents.abs() <= MAX_CENTS as f64 {
            Ok(Self(cents as i64))
        } else {
            Err(MoneyParseError(value.to_string()))
        }
    }
}

// Totals saturate at the i64 limits instead of wrapping or panicking.
macro_rules! cents_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $saturating:ident) => {
        impl $op for Money {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self(self.0.$saturating(rhs.0))
            }
        }

        impl $assign for Money {
            fn $assign_method(&mut self, rhs: Self) {
                self.0 = self.0.$saturating(rhs.0);
            }
        }
    };
}

cents_op!(Add, add, AddAssign, add_assign, saturating_add);
cents_op!(Sub, sub, SubAssign, sub_assign, saturating_sub);

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(text: &str) -> i64 {
        Money::parse(text).unwrap().cents()
    }

    #[test]
    fn test_parse_accepted_forms() {
        let cases = [
            ("10.50", 1050),
            ("$10.50", 1050),
            ("-10.50", -1050),
            ("-$3", -300),
            ("+10", 1000),
            ("10.5", 1050),
            (".5", 50),
            ("7.", 700),
            (" 0.05 ", 5),
            ("1.005", 101),
            ("2.994", 299),
        ];
        for (text, expected) in cases {
            assert_eq!(cents(text), expected, "parsing {:?}", text);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", "abc", "1.2.3", "-", ".", "1,000", "$", "12a", "--5"] {
            assert!(Money::parse(text).is_err(), "accepted {:?}", text);
        }
        assert_eq!(Money::parse("x").unwrap_err().to_string(), "'x' is not a valid amount");
    }

    #[test]
    fn test_symbol_and_grouping() {
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(-1050).to_string(), "-$10.50");
        assert_eq!(Money::from_cents(123_456_789).to_string(), "$1,234,567.89");
        assert_eq!(Money::from_cents(100_000).format_with_symbol("€"), "€1,000.00");
        assert_eq!(format!("{:>8}", Money::from_cents(500)), "   $5.00");
    }

    #[test]
    fn test_signed_totals() {
        let mut balance = Money::from_cents(2_000);
        balance -= Money::from_cents(2_500);
        assert!(balance.is_negative());
        assert_eq!(balance.abs(), Money::from_cents(500));

        balance += Money::from_cents(500);
        assert!(balance.is_zero());

        let total: Money = [1999, -499, 1].into_iter().map(Money::from_cents).sum();
        assert_eq!(total, Money::from_cents(1501));
        assert_eq!(-total, Money::from_cents(-1501));
    }

    #[test]
    fn test_huge_amounts_rejected_and_totals_saturate() {
        assert_eq!(cents("1000000000000"), MAX_CENTS);
        assert!(Money::parse("1000000000000.01").is_err());
        assert!(Money::parse("92233720368547758").is_err());
        assert!(Money::try_from(1e13).is_err());

        let near_limit = Money::from_cents(i64::MAX - 1);
        let total: Money = [near_limit, near_limit, Money::from_cents(5)].into_iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));
        assert_eq!(-Money::from_cents(i64::MIN), Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_json_number_form() {
        assert_eq!(serde_json::to_string(&Money::from_cents(1250)).unwrap(), "12.5");
        assert_eq!(serde_json::from_str::<Money>("1200").unwrap().cents(), 120_000);
        assert_eq!(serde_json::from_str::<Money>("80.499").unwrap().cents(), 8_050);
        assert!(Money::try_from(f64::NAN).is_err());
    }
}
