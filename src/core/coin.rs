//! Coins and decimal amounts
//!
//! Ledger amounts are unsigned integers in a token's min unit. Main-unit
//! amounts are decimal strings; conversion between the two is exact for any
//! decimal with at most `scale` fraction digits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest exponent whose power of ten fits in a `u128`
pub const MAX_DECIMAL_DIGITS: u8 = 38;

/// `10^exp` as a `u128`
///
/// Panics if `exp` exceeds [`MAX_DECIMAL_DIGITS`]; token scales are capped far below that.
pub fn pow10(exp: u8) -> u128 {
    assert!(exp <= MAX_DECIMAL_DIGITS, "10^{} does not fit in u128", exp);
    10u128.pow(exp as u32)
}

/// Parse an unsigned decimal string into an integer scaled by `10^scale`
///
/// `"1.5"` at scale 3 becomes `1500`. More than `scale` fraction digits is an error.
pub fn parse_decimal(s: &str, scale: u8) -> Result<u128, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty decimal".to_string());
    }
    if s.starts_with('-') {
        return Err(format!("decimal {} must not be negative", s));
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(format!("invalid decimal {}", s));
    }
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(format!("invalid decimal {}", s));
    }
    if frac_part.len() > scale as usize {
        return Err(format!(
            "decimal {} has more than {} fraction digits",
            s, scale
        ));
    }

    let overflow = || format!("decimal {} is out of range", s);

    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| overflow())?
    };

    let mut frac_value: u128 = 0;
    if !frac_part.is_empty() {
        frac_value = frac_part.parse().map_err(|_| overflow())?;
        frac_value = frac_value
            .checked_mul(pow10(scale - frac_part.len() as u8))
            .ok_or_else(overflow)?;
    }

    int_value
        .checked_mul(pow10(scale))
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(overflow)
}

/// Like [`parse_decimal`] but drops fraction digits beyond `scale`
pub fn parse_decimal_truncated(s: &str, scale: u8) -> Result<u128, String> {
    let s = s.trim();
    match s.split_once('.') {
        Some((int_part, frac_part)) if frac_part.len() > scale as usize => {
            if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("invalid decimal {}", s));
            }
            let kept = &frac_part[..scale as usize];
            if kept.is_empty() {
                parse_decimal(int_part, scale)
            } else {
                parse_decimal(&format!("{}.{}", int_part, kept), scale)
            }
        }
        _ => parse_decimal(s, scale),
    }
}

/// Format an integer scaled by `10^scale` as a decimal string without trailing zeros
pub fn format_decimal(value: u128, scale: u8) -> String {
    if scale == 0 {
        return value.to_string();
    }
    let unit = pow10(scale);
    let int_part = value / unit;
    let frac_part = value % unit;
    if frac_part == 0 {
        return int_part.to_string();
    }

    let frac = format!("{:0width$}", frac_part, width = scale as usize);
    format!("{}.{}", int_part, frac.trim_end_matches('0'))
}

/// An integer amount of a ledger denomination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "amount_string")]
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A decimal amount of a main-unit denomination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: String,
}

impl DecCoin {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Serializes `u128` amounts as decimal strings
pub(crate) mod amount_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.trim();
        if s.starts_with('-') {
            return Err(de::Error::custom(format!(
                "amount {} must not be negative",
                s
            )));
        }
        s.parse::<u128>()
            .map_err(|_| de::Error::custom(format!("invalid amount {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.5", 3).unwrap(), 1500);
        assert_eq!(parse_decimal("42", 0).unwrap(), 42);
        assert_eq!(parse_decimal(".25", 2).unwrap(), 25);
        assert_eq!(parse_decimal("21000000", 18).unwrap(), 21_000_000 * pow10(18));

        assert!(parse_decimal("", 2).is_err());
        assert!(parse_decimal("-1", 2).is_err());
        assert!(parse_decimal("1.2.3", 2).is_err());
        assert!(parse_decimal("1.234", 2).is_err());
        assert!(parse_decimal("abc", 2).is_err());
        assert!(parse_decimal(".", 2).is_err());
    }

    #[test]
    fn test_parse_decimal_truncated() {
        assert_eq!(parse_decimal_truncated("1.239", 2).unwrap(), 123);
        assert_eq!(parse_decimal_truncated("7.9", 0).unwrap(), 7);
        assert_eq!(parse_decimal_truncated("1.2", 2).unwrap(), 120);
        assert!(parse_decimal_truncated("1.12345é", 6).is_err());
        assert!(parse_decimal_truncated("1.1é", 1).is_err());
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(1500, 3), "1.5");
        assert_eq!(format_decimal(1000, 3), "1");
        assert_eq!(format_decimal(5, 3), "0.005");
        assert_eq!(format_decimal(0, 6), "0");
        assert_eq!(format_decimal(77, 0), "77");
    }

    #[test]
    fn test_coin_amount_serde() {
        let coin = Coin::new("ustake", 60_000_000_000);
        let json = serde_json::to_string(&coin).unwrap();
        assert_eq!(json, r#"{"denom":"ustake","amount":"60000000000"}"#);

        let back: Coin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coin);

        let negative = serde_json::from_str::<Coin>(r#"{"denom":"ustake","amount":"-1"}"#);
        assert!(negative.is_err());
    }
}
