//! Registry parameters
//!
//! Process-wide fee configuration: the community tax rate applied to every
//! collected fee, the base fee for issuing a token and the ratio that derives
//! the minting fee from the issuance fee.

use crate::config::default_native_token;
use crate::core::coin::{format_decimal, parse_decimal, pow10, Coin};
use crate::core::error::{RegistryError, RegistryResult};
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Constants
// =============================================================================

/// Fraction digits carried by a [`Rate`]
pub const RATE_PRECISION: u8 = 18;

/// Issuance base fee in whole native tokens
pub const DEFAULT_ISSUE_BASE_FEE: u128 = 60_000;

// =============================================================================
// Rate
// =============================================================================

/// Fixed-point fraction with 18 decimal places
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rate(u128);

impl Rate {
    pub const ZERO: Rate = Rate(0);
    pub const ONE: Rate = Rate(10u128.pow(RATE_PRECISION as u32));

    /// Build from raw parts of 10^-18
    pub const fn from_parts(parts: u128) -> Self {
        Self(parts)
    }

    /// Build from a whole percentage
    pub fn from_percent(percent: u64) -> Self {
        Self(percent as u128 * pow10(RATE_PRECISION - 2))
    }

    pub fn parts(&self) -> u128 {
        self.0
    }

    /// True when the rate lies in [0, 1]
    pub fn is_fraction(&self) -> bool {
        *self <= Self::ONE
    }

    /// `floor(amount * rate)` without intermediate overflow
    pub fn mul_floor(&self, amount: u128) -> u128 {
        let one = Self::ONE.0;
        let whole = (amount / one).saturating_mul(self.0);
        let rest = (amount % one).saturating_mul(self.0) / one;
        whole.saturating_add(rest)
    }
}

impl FromStr for Rate {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_decimal(s, RATE_PRECISION)
            .map(Rate)
            .map_err(RegistryError::InvalidParameter)
    }
}

impl TryFrom<String> for Rate {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rate> for String {
    fn from(rate: Rate) -> Self {
        rate.to_string()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_decimal(self.0, RATE_PRECISION))
    }
}

// =============================================================================
// Params
// =============================================================================

/// Fee parameters, read on every fee computation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Share of each fee sent to the fee collector, the rest is burned (e.g. 0.4)
    pub token_tax_rate: Rate,
    /// Fee for issuing a token with a three-letter symbol
    pub issue_token_base_fee: Coin,
    /// Minting fee as a share of the issuance fee (e.g. 0.1)
    pub mint_token_fee_ratio: Rate,
}

impl Params {
    pub fn new(
        token_tax_rate: Rate,
        issue_token_base_fee: Coin,
        mint_token_fee_ratio: Rate,
    ) -> Self {
        Self {
            token_tax_rate,
            issue_token_base_fee,
            mint_token_fee_ratio,
        }
    }

    /// Default parameters with the base fee denominated in the given native token
    pub fn for_native_token(native: &Token) -> Self {
        Self {
            token_tax_rate: Rate::from_percent(40),
            issue_token_base_fee: Coin::new(
                native.min_unit.clone(),
                DEFAULT_ISSUE_BASE_FEE * pow10(native.scale),
            ),
            mint_token_fee_ratio: Rate::from_percent(10),
        }
    }

    /// Decode parameters from JSON, reporting any malformed field as an invalid parameter
    pub fn from_json(json: &str) -> RegistryResult<Self> {
        let params: Params = serde_json::from_str(json)
            .map_err(|e| RegistryError::InvalidParameter(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> RegistryResult<()> {
        if !self.token_tax_rate.is_fraction() {
            return Err(RegistryError::InvalidParameter(format!(
                "token tax rate [{}] should be between [0, 1]",
                self.token_tax_rate
            )));
        }

        if !self.mint_token_fee_ratio.is_fraction() {
            return Err(RegistryError::InvalidParameter(format!(
                "fee ratio for minting tokens [{}] should be between [0, 1]",
                self.mint_token_fee_ratio
            )));
        }

        if self.issue_token_base_fee.denom.trim().is_empty() {
            return Err(RegistryError::InvalidParameter(
                "base fee for issuing token must have a denom".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::for_native_token(&default_native_token())
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Params:\n  TokenTaxRate:      {}\n  IssueTokenBaseFee: {}\n  MintTokenFeeRatio: {}",
            self.token_tax_rate, self.issue_token_base_fee, self.mint_token_fee_ratio
        )
    }
}

/// Stored parameters together with their change counter
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedParams {
    pub version: u64,
    pub params: Params,
}

impl VersionedParams {
    /// The next version carrying `params`
    pub fn next(&self, params: Params) -> Self {
        Self {
            version: self.version + 1,
            params,
        }
    }
}
