use std::fmt;
use std::str::FromStr;

use crate::errors::FixedPointError;
use crate::errors::Result;

pub const FIXED_POINT_MULTIPLIER: i64 = 100_000_000;
pub const DECIMAL_PLACES: u32 = 8;

/// Fixed-point decimal with 8 decimal places (satoshi precision)
///
/// Quantities, prices and balances all travel through the desk in this form so
/// that volume arithmetic never goes through binary floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedPoint(pub i64);

impl FixedPoint {
    pub const ZERO: Self = FixedPoint(0);

    /// Whole units, e.g. `from_int(5)` is `5.00000000`
    pub fn from_int(value: i64) -> Result<Self> {
        value.checked_mul(FIXED_POINT_MULTIPLIER).map(FixedPoint).ok_or(FixedPointError::Overflow)
    }

    #[inline(always)]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0.checked_add(rhs.0).map(FixedPoint).ok_or(FixedPointError::Overflow)
    }

    /// Fixed-point multiplication: (a * b) / MULTIPLIER, rounded half away from zero
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        let product = self.0 as i128 * rhs.0 as i128;
        narrow(div_round(product, FIXED_POINT_MULTIPLIER as i128))
    }

    /// Fixed-point division: (a * MULTIPLIER) / b, rounded half away from zero
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.0 == 0 {
            return Err(FixedPointError::DivisionByZero);
        }
        let scaled = self.0 as i128 * FIXED_POINT_MULTIPLIER as i128;
        narrow(div_round(scaled, rhs.0 as i128))
    }

    /// Round to `places` fractional digits (0..=8)
    pub fn round_dp(self, places: u32) -> Self {
        if places >= DECIMAL_PLACES {
            return self;
        }
        let factor = 10i128.pow(DECIMAL_PLACES - places);
        let rounded = div_round(self.0 as i128, factor) * factor;
        i64::try_from(rounded).map(FixedPoint).unwrap_or(self)
    }

    /// Canonical display form: 8 fractional digits with trailing zeros and a
    /// dangling decimal point removed
    pub fn trimmed(self) -> String {
        let rendered = self.to_string();
        rendered.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

impl fmt::Display for FixedPoint {
    /// Renders 8 fractional digits unless a smaller precision is requested
    /// (`{:.2}` rounds to cents)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = f.precision().map_or(DECIMAL_PLACES, |precision| (precision as u32).min(DECIMAL_PLACES));
        let value = self.round_dp(places).0;

        let sign = if value < 0 { "-" } else { "" };
        let magnitude = value.unsigned_abs();
        let integer = magnitude / FIXED_POINT_MULTIPLIER as u64;
        let fraction = magnitude % FIXED_POINT_MULTIPLIER as u64;

        if places == 0 {
            return write!(f, "{sign}{integer}");
        }

        let fraction = fraction / 10u64.pow(DECIMAL_PLACES - places);
        write!(f, "{sign}{integer}.{fraction:0width$}", width = places as usize)
    }
}

impl FromStr for FixedPoint {
    type Err = FixedPointError;

    fn from_str(text: &str) -> Result<Self> {
        parse_decimal(text)
    }
}

/// Parse a decimal string such as "42250.15", ".5" or "-0.00000123"
///
/// Digits beyond the 8th decimal place are rounded half up. Anything other than
/// an optional leading minus, digits and a single decimal point is rejected.
pub fn parse_decimal(text: &str) -> Result<FixedPoint> {
    let bytes = text.as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut integer: i128 = 0;
    let mut fraction: i128 = 0;
    let mut fraction_digits = 0u32;
    let mut round_up = false;
    let mut seen_dot = false;
    let mut seen_digit = false;

    for &byte in digits {
        match byte {
            b'0'..=b'9' => {
                seen_digit = true;
                let digit = (byte - b'0') as i128;
                if !seen_dot {
                    integer = integer * 10 + digit;
                    if integer > i64::MAX as i128 {
                        return Err(FixedPointError::Overflow);
                    }
                } else if fraction_digits < DECIMAL_PLACES {
                    fraction = fraction * 10 + digit;
                    fraction_digits += 1;
                } else if fraction_digits == DECIMAL_PLACES {
                    // First dropped digit decides rounding, the rest are ignored
                    round_up = digit >= 5;
                    fraction_digits += 1;
                }
            }
            b'.' if !seen_dot => seen_dot = true,
            _ => return Err(FixedPointError::Invalid(text.to_string())),
        }
    }

    if !seen_digit {
        return Err(FixedPointError::Invalid(text.to_string()));
    }

    let scale = 10i128.pow(DECIMAL_PLACES - fraction_digits.min(DECIMAL_PLACES));
    let mut raw = integer * FIXED_POINT_MULTIPLIER as i128 + fraction * scale + i128::from(round_up);
    if negative {
        raw = -raw;
    }

    narrow(raw)
}

/// Normalise every purely numeric token of a space-separated description
///
/// "buy 0.25000000 XXBTZEUR @ limit 5000.0" becomes "buy 0.25 XXBTZEUR @ limit 5000".
/// Currency codes, keywords and signed values are left untouched.
pub fn trim_description(description: &str) -> String {
    description
        .split(' ')
        .map(|token| {
            if is_numeric_token(token) {
                // Only overflow can fail here; such a token is passed through as is
                parse_decimal(token).map(FixedPoint::trimmed).unwrap_or_else(|_| token.to_string())
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Digits with at most one decimal point
fn is_numeric_token(token: &str) -> bool {
    let mut dots = 0;
    let mut digits = 0;
    for ch in token.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

#[inline(always)]
fn div_round(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() { quotient + numerator.signum() * denominator.signum() } else { quotient }
}

#[inline(always)]
fn narrow(raw: i128) -> Result<FixedPoint> {
    i64::try_from(raw).map(FixedPoint).map_err(|_| FixedPointError::Overflow)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn fp(text: &str) -> FixedPoint {
        text.parse().unwrap()
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(fp("1.0"), FixedPoint(100_000_000));
        assert_eq!(fp("0.00000001"), FixedPoint(1));
        assert_eq!(fp("42250.15"), FixedPoint(4_225_015_000_000));
        assert_eq!(fp("100"), FixedPoint(10_000_000_000));
        assert_eq!(fp("-50.5"), FixedPoint(-5_050_000_000));
        assert_eq!(fp(".5"), FixedPoint(50_000_000));
        assert_eq!(fp("5."), FixedPoint(500_000_000));
    }

    #[test]
    fn test_parse_rounds_excess_decimals() {
        // Kraken reports balances with 10 decimals
        assert_eq!(fp("0.2500000000"), FixedPoint(25_000_000));
        assert_eq!(fp("1.123456785"), FixedPoint(112_345_679));
        assert_eq!(fp("1.123456784999"), FixedPoint(112_345_678));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("".parse::<FixedPoint>(), Err(FixedPointError::Invalid(_))));
        assert!(matches!("abc".parse::<FixedPoint>(), Err(FixedPointError::Invalid(_))));
        assert!(matches!("1.2.3".parse::<FixedPoint>(), Err(FixedPointError::Invalid(_))));
        assert!(matches!("-".parse::<FixedPoint>(), Err(FixedPointError::Invalid(_))));
        assert!(matches!("50EUR".parse::<FixedPoint>(), Err(FixedPointError::Invalid(_))));
        assert!(matches!("99999999999999999999".parse::<FixedPoint>(), Err(FixedPointError::Overflow)));
    }

    #[test]
    fn test_display_full_precision() {
        assert_eq!(fp("5").to_string(), "5.00000000");
        assert_eq!(fp("0.25").to_string(), "0.25000000");
        assert_eq!(fp("-1.5").to_string(), "-1.50000000");
    }

    #[test]
    fn test_display_with_precision() {
        assert_eq!(format!("{:.2}", fp("1234.5678")), "1234.57");
        assert_eq!(format!("{:.2}", fp("0.004")), "0.00");
        assert_eq!(format!("{:.0}", fp("2.5")), "3");
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(fp("1.50000000").trimmed(), "1.5");
        assert_eq!(fp("2.00000000").trimmed(), "2");
        assert_eq!(fp("0.00000001").trimmed(), "0.00000001");
        assert_eq!(fp("0").trimmed(), "0");
        assert_eq!(fp("100").trimmed(), "100");
    }

    #[test]
    fn test_checked_div() {
        let volume = fp("50").checked_div(fp("10")).unwrap();
        assert_eq!(volume.to_string(), "5.00000000");

        let volume = fp("100").checked_div(fp("3")).unwrap();
        assert_eq!(volume.to_string(), "33.33333333");

        let volume = fp("2").checked_div(fp("3")).unwrap();
        assert_eq!(volume.to_string(), "0.66666667");

        assert_eq!(fp("1").checked_div(FixedPoint::ZERO), Err(FixedPointError::DivisionByZero));
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(fp("0.5").checked_mul(fp("30000")).unwrap(), fp("15000"));
        assert_eq!(fp("0.00000001").checked_mul(fp("0.5")).unwrap(), FixedPoint(1));
        assert_eq!(FixedPoint(i64::MAX).checked_mul(fp("2")), Err(FixedPointError::Overflow));
    }

    #[test]
    fn test_trim_description() {
        assert_eq!(trim_description("buy 0.25000000 XXBTZEUR @ limit 5000.0"), "buy 0.25 XXBTZEUR @ limit 5000");
        assert_eq!(trim_description("sell 1.00000000 XETHZEUR @ limit 250.50000"), "sell 1 XETHZEUR @ limit 250.5");
        assert_eq!(trim_description("no numbers here"), "no numbers here");
        // Malformed tokens are not numbers and stay as they are
        assert_eq!(trim_description("1.2.3 -5.0 ."), "1.2.3 -5.0 .");
    }

    #[test]
    fn test_trim_description_is_idempotent() {
        let once = trim_description("buy 0.25000000 XXBTZEUR @ limit 5000.0");
        assert_eq!(trim_description(&once), once);
    }

    proptest! {
        #[test]
        fn prop_trimmed_is_idempotent(raw in -100_000_000_000_000_000i64..100_000_000_000_000_000i64) {
            let once = FixedPoint(raw).trimmed();
            let twice = once.parse::<FixedPoint>().unwrap().trimmed();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_display_round_trips(raw in any::<i64>()) {
            let value = FixedPoint(raw);
            prop_assert_eq!(value.to_string().parse::<FixedPoint>().unwrap(), value);
        }

        #[test]
        fn prop_trim_description_is_idempotent(
            integer in 0u32..1_000_000,
            fraction in 0u32..100_000_000,
            code in "[A-Z]{3,8}",
        ) {
            let description = format!("buy {integer}.{fraction:08} {code} @ limit {integer}.0");
            let once = trim_description(&description);
            prop_assert_eq!(trim_description(&once), once);
        }
    }
}
