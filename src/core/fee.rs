//! Token fee curve
//!
//! Issuing and minting are priced by symbol length. Short symbols are scarce
//! and expensive, long ones cheap:
//!
//! ```text
//! factor    = (ln(len(symbol)) / ln(3))^4      rounded to hundredths
//! issue fee = base fee / factor                truncated to whole fee units, at least one
//! mint fee  = issue fee * mint fee ratio       truncated to whole fee units, at least one
//! ```
//!
//! Every collected fee is split into a community tax and a burned remainder.

use crate::core::coin::{pow10, Coin};
use crate::core::params::Rate;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Constants
// =============================================================================

/// Logarithm base of the fee factor
pub const FEE_FACTOR_BASE: f64 = 3.0;

/// Exponent of the fee factor
pub const FEE_FACTOR_EXP: i32 = 4;

/// Default fee granularity: one whole token of a six-decimal native denom
pub const DEFAULT_POWER_REDUCTION: u128 = 1_000_000;

// =============================================================================
// Fee Factor
// =============================================================================

/// Fee factor for a symbol of the given length, in hundredths
///
/// The floating point result is rounded to two decimals before any integer
/// arithmetic touches it, so fees only depend on this small table of values.
///
/// Panics on a zero length: symbols are validated before being priced.
pub fn fee_factor_hundredths(symbol_len: usize) -> u128 {
    assert!(symbol_len > 0, "the length of a symbol must be greater than 0");

    let numerator = (symbol_len as f64).ln();
    let denominator = FEE_FACTOR_BASE.ln();
    let factor = (numerator / denominator).powi(FEE_FACTOR_EXP);

    // ln(1) = 0; a single character would otherwise divide by zero
    ((factor * 100.0).round() as u128).max(1)
}

// =============================================================================
// Fee Curve
// =============================================================================

/// Converts base fees into symbol-dependent issuance and minting fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCurve {
    /// Fees are truncated to multiples of this amount
    power_reduction: u128,
}

impl FeeCurve {
    pub fn new(power_reduction: u128) -> Self {
        Self {
            power_reduction: power_reduction.max(1),
        }
    }

    /// Fee unit of one whole token with the given scale
    pub fn for_scale(scale: u8) -> Self {
        Self::new(pow10(scale))
    }

    pub fn power_reduction(&self) -> u128 {
        self.power_reduction
    }

    /// Issuance fee for `symbol` given the issuance base fee
    pub fn issue_fee(&self, symbol: &str, base_fee: u128) -> u128 {
        let factor = fee_factor_hundredths(symbol.len());

        // floor(base_fee * 100 / factor) without overflowing on large bases
        let fee = (base_fee / factor).saturating_mul(100) + (base_fee % factor) * 100 / factor;

        self.to_fee_unit(fee)
    }

    /// Minting fee for `symbol`: a share of its issuance fee
    pub fn mint_fee(&self, symbol: &str, base_fee: u128, ratio: Rate) -> u128 {
        let issue_fee = self.issue_fee(symbol, base_fee);
        self.to_fee_unit(ratio.mul_floor(issue_fee))
    }

    /// Truncate to whole fee units, never returning less than one unit
    fn to_fee_unit(&self, fee: u128) -> u128 {
        let power = fee / self.power_reduction;
        power.max(1).saturating_mul(self.power_reduction)
    }
}

impl Default for FeeCurve {
    fn default() -> Self {
        Self::new(DEFAULT_POWER_REDUCTION)
    }
}

// =============================================================================
// Fee Split
// =============================================================================

/// How a collected fee is distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Sent to the fee collector pool
    pub community_tax: u128,
    /// Destroyed
    pub burned: u128,
}

/// Split `fee` into the taxed share and the burned remainder
pub fn split_fee(fee: u128, tax_rate: Rate) -> FeeSplit {
    let community_tax = tax_rate.mul_floor(fee).min(fee);
    FeeSplit {
        community_tax,
        burned: fee - community_tax,
    }
}

// =============================================================================
// Fee Quote
// =============================================================================

/// Fees for a symbol, as reported by the fee query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFees {
    /// Whether the symbol is already taken
    pub exist: bool,
    pub issue_fee: Coin,
    pub mint_fee: Coin,
}

impl fmt::Display for TokenFees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exist {
            writeln!(f, "The symbol already exists")?;
        }
        write!(
            f,
            "Fees:\n  IssueFee: {}\n  MintFee:  {}",
            self.issue_fee, self.mint_fee
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fee_factor() {
        assert_eq!(fee_factor_hundredths(1), 1);
        assert_eq!(fee_factor_hundredths(2), 16);
        assert_eq!(fee_factor_hundredths(3), 100);
        assert_eq!(fee_factor_hundredths(4), 254);
        assert_eq!(fee_factor_hundredths(5), 461);
        assert_eq!(fee_factor_hundredths(6), 708);
        assert_eq!(fee_factor_hundredths(7), 984);
        assert_eq!(fee_factor_hundredths(8), 1284);
        assert_eq!(fee_factor_hundredths(9), 1600);
    }

    #[test]
    #[should_panic]
    fn test_fee_factor_empty_symbol() {
        fee_factor_hundredths(0);
    }

    #[test]
    fn test_issue_fee_by_length() {
        let curve = FeeCurve::new(1);

        assert_eq!(curve.issue_fee("btc", 60_000), 60_000);
        assert_eq!(curve.issue_fee("atom", 60_000), 23_622);
        assert_eq!(curve.issue_fee("tokens", 60_000), 8_474);
        assert_eq!(curve.issue_fee("longname", 60_000), 4_672);
    }

    #[test]
    fn test_issue_fee_in_fee_units() {
        let curve = FeeCurve::default();
        let base = 60_000 * DEFAULT_POWER_REDUCTION;

        assert_eq!(curve.issue_fee("btc", base), 60_000 * DEFAULT_POWER_REDUCTION);
        assert_eq!(curve.issue_fee("longname", base), 4_672 * DEFAULT_POWER_REDUCTION);
    }

    #[test]
    fn test_fee_never_zero() {
        let curve = FeeCurve::default();
        assert_eq!(curve.issue_fee("btc", 0), DEFAULT_POWER_REDUCTION);
        assert_eq!(curve.issue_fee("longname", 1), DEFAULT_POWER_REDUCTION);
        assert_eq!(
            curve.mint_fee("btc", 60_000 * DEFAULT_POWER_REDUCTION, Rate::ZERO),
            DEFAULT_POWER_REDUCTION
        );
    }

    #[test]
    fn test_mint_fee() {
        let curve = FeeCurve::default();
        let base = 60_000 * DEFAULT_POWER_REDUCTION;
        let ratio = Rate::from_percent(10);

        assert_eq!(curve.mint_fee("btc", base, ratio), 6_000 * DEFAULT_POWER_REDUCTION);
        // 4672 * 0.1 = 467.2 whole tokens, truncated
        assert_eq!(curve.mint_fee("longname", base, ratio), 467 * DEFAULT_POWER_REDUCTION);
    }

    #[test]
    fn test_large_base_fee() {
        let curve = FeeCurve::for_scale(18);
        let base = 60_000 * pow10(18);
        assert_eq!(curve.issue_fee("btc", base), base);
        assert_eq!(curve.issue_fee("longname", base), 4_672 * pow10(18));
    }

    #[test]
    fn test_split_fee() {
        let split = split_fee(1000, Rate::from_percent(40));
        assert_eq!(split.community_tax, 400);
        assert_eq!(split.burned, 600);

        let all_burned = split_fee(1000, Rate::ZERO);
        assert_eq!(all_burned.community_tax, 0);
        assert_eq!(all_burned.burned, 1000);

        let all_taxed = split_fee(999, Rate::ONE);
        assert_eq!(all_taxed.community_tax, 999);
        assert_eq!(all_taxed.burned, 0);
    }

    #[test]
    fn test_token_fees_display() {
        let fees = TokenFees {
            exist: true,
            issue_fee: Coin::new("ustake", 60),
            mint_fee: Coin::new("ustake", 6),
        };
        let out = fees.to_string();
        assert!(out.starts_with("The symbol already exists"));
        assert!(out.contains("IssueFee: 60ustake"));
    }

    proptest! {
        #[test]
        fn prop_issue_fee_non_increasing_in_length(
            base in 0u128..1_000_000_000_000_000_000_000_000u128,
            len in 3usize..8,
        ) {
            let curve = FeeCurve::default();
            let shorter = curve.issue_fee(&"a".repeat(len), base);
            let longer = curve.issue_fee(&"a".repeat(len + 1), base);
            prop_assert!(longer <= shorter);
            prop_assert!(longer >= curve.power_reduction());
        }

        #[test]
        fn prop_fee_split_conserves_fee(fee in any::<u64>(), percent in 0u64..=100) {
            let split = split_fee(fee as u128, Rate::from_percent(percent));
            prop_assert_eq!(split.community_tax + split.burned, fee as u128);
        }
    }
}
