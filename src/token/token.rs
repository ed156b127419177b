//! Fungible token record
//!
//! A token is identified by its lowercase symbol and backed on the ledger by
//! its min unit. Supplies are counted in main units; the ledger counts min
//! units, `10^scale` of them per main unit.

use crate::core::coin::{format_decimal, parse_decimal_truncated, pow10, Coin, DecCoin};
use crate::core::error::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Constants
// =============================================================================

/// Maximum max supply: 1000 billion
pub const MAXIMUM_MAX_SUPPLY: u64 = 1_000_000_000_000;
/// Maximum initial supply: 100 billion
pub const MAXIMUM_INIT_SUPPLY: u64 = 100_000_000_000;
/// Maximum number of decimal places
pub const MAXIMUM_SCALE: u8 = 18;
pub const MINIMUM_SYMBOL_LEN: usize = 3;
pub const MAXIMUM_SYMBOL_LEN: usize = 8;
pub const MAXIMUM_NAME_LEN: usize = 32;
pub const MINIMUM_MIN_UNIT_LEN: usize = 3;
pub const MAXIMUM_MIN_UNIT_LEN: usize = 10;

/// Name placeholder meaning "leave the name unchanged"
pub const DO_NOT_MODIFY: &str = "[do-not-modify]";

// =============================================================================
// Validators
// =============================================================================

fn is_denom_like(s: &str, min_len: usize, max_len: usize) -> bool {
    (min_len..=max_len).contains(&s.len())
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Check a symbol: 3-8 alphanumeric characters beginning with a letter
pub fn check_symbol(symbol: &str) -> RegistryResult<()> {
    if !is_denom_like(symbol, MINIMUM_SYMBOL_LEN, MAXIMUM_SYMBOL_LEN) {
        return Err(RegistryError::InvalidArgument(format!(
            "invalid symbol {}, only accepts alphanumeric characters beginning with an english letter, length [{}, {}]",
            symbol, MINIMUM_SYMBOL_LEN, MAXIMUM_SYMBOL_LEN
        )));
    }
    Ok(())
}

/// Check a min unit: 3-10 alphanumeric characters beginning with a letter
pub fn check_min_unit(min_unit: &str) -> RegistryResult<()> {
    if !is_denom_like(min_unit, MINIMUM_MIN_UNIT_LEN, MAXIMUM_MIN_UNIT_LEN) {
        return Err(RegistryError::InvalidArgument(format!(
            "invalid min unit {}, only accepts alphanumeric characters beginning with an english letter, length [{}, {}]",
            min_unit, MINIMUM_MIN_UNIT_LEN, MAXIMUM_MIN_UNIT_LEN
        )));
    }
    Ok(())
}

/// Check a display name: 1-32 characters once trimmed
pub fn check_name(name: &str) -> RegistryResult<()> {
    let len = name.trim().chars().count();
    if len == 0 || len > MAXIMUM_NAME_LEN {
        return Err(RegistryError::InvalidArgument(format!(
            "invalid token name {}, only accepts length (0, {}]",
            name, MAXIMUM_NAME_LEN
        )));
    }
    Ok(())
}

/// Check an account identifier is present
pub fn check_address(address: &str, role: &str) -> RegistryResult<()> {
    if address.trim().is_empty() {
        return Err(RegistryError::InvalidArgument(format!(
            "the {} must be specified",
            role
        )));
    }
    if address.len() > u8::MAX as usize {
        return Err(RegistryError::InvalidArgument(format!(
            "the {} must not exceed {} bytes",
            role,
            u8::MAX
        )));
    }
    Ok(())
}

/// Lowercase and trim a symbol or min unit
pub fn normalize_denom(denom: &str) -> String {
    denom.trim().to_lowercase()
}

// =============================================================================
// Token
// =============================================================================

/// A fungible token registered on the ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Unique lowercase symbol, the main unit denom (e.g. "btc")
    pub symbol: String,
    /// Display name (e.g. "Bitcoin Network")
    pub name: String,
    /// Decimal places between the main unit and the min unit
    pub scale: u8,
    /// Unique lowercase ledger denom (e.g. "satoshi")
    pub min_unit: String,
    /// Supply minted to the owner at issuance, in main units
    pub initial_supply: u64,
    /// Ceiling on outstanding supply, in main units
    pub max_supply: u64,
    /// Whether the owner may mint more
    pub mintable: bool,
    /// Account allowed to edit, mint and transfer the token
    pub owner: String,
}

impl Token {
    /// Create a token record, normalizing denoms and resolving a zero max supply
    ///
    /// A zero `max_supply` becomes [`MAXIMUM_MAX_SUPPLY`] for mintable tokens
    /// and `initial_supply` otherwise. No validation is done here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl AsRef<str>,
        name: impl AsRef<str>,
        min_unit: impl AsRef<str>,
        scale: u8,
        initial_supply: u64,
        max_supply: u64,
        mintable: bool,
        owner: impl Into<String>,
    ) -> Self {
        let max_supply = match max_supply {
            0 if mintable => MAXIMUM_MAX_SUPPLY,
            0 => initial_supply,
            other => other,
        };

        Self {
            symbol: normalize_denom(symbol.as_ref()),
            name: name.as_ref().trim().to_string(),
            scale,
            min_unit: normalize_denom(min_unit.as_ref()),
            initial_supply,
            max_supply,
            mintable,
            owner: owner.into(),
        }
    }

    /// Validate every field of the record
    pub fn validate(&self) -> RegistryResult<()> {
        check_address(&self.owner, "owner of the token")?;
        check_name(&self.name)?;
        check_symbol(&self.symbol)?;
        check_min_unit(&self.min_unit)?;

        if self.initial_supply > MAXIMUM_INIT_SUPPLY {
            return Err(RegistryError::InvalidArgument(format!(
                "invalid token initial supply {}, only accepts value [0, {}]",
                self.initial_supply, MAXIMUM_INIT_SUPPLY
            )));
        }

        if self.max_supply < self.initial_supply || self.max_supply > MAXIMUM_MAX_SUPPLY {
            return Err(RegistryError::InvalidArgument(format!(
                "invalid token max supply {}, only accepts value [{}, {}]",
                self.max_supply, self.initial_supply, MAXIMUM_MAX_SUPPLY
            )));
        }

        if self.scale > MAXIMUM_SCALE {
            return Err(RegistryError::InvalidArgument(format!(
                "invalid token scale {}, only accepts value [0, {}]",
                self.scale, MAXIMUM_SCALE
            )));
        }

        Ok(())
    }

    /// Min units per main unit
    pub fn precision(&self) -> u128 {
        pow10(self.scale)
    }

    /// Convert a main-unit amount to min units
    pub fn to_min_unit(&self, amount: u64) -> u128 {
        amount as u128 * self.precision()
    }

    /// The supply ceiling in min units
    pub fn max_supply_min_units(&self) -> u128 {
        self.to_min_unit(self.max_supply)
    }

    /// Express a ledger coin of this token in main units
    pub fn to_main_coin(&self, coin: &Coin) -> RegistryResult<DecCoin> {
        if coin.denom == self.symbol {
            return Ok(DecCoin::new(&self.symbol, coin.amount.to_string()));
        }
        if coin.denom != self.min_unit {
            return Err(self.denom_mismatch(&coin.denom));
        }

        Ok(DecCoin::new(
            &self.symbol,
            format_decimal(coin.amount, self.scale),
        ))
    }

    /// Express a main-unit amount of this token as a ledger coin
    ///
    /// Fraction digits beyond the token's scale are truncated.
    pub fn to_min_coin(&self, coin: &DecCoin) -> RegistryResult<Coin> {
        let scale = if coin.denom == self.min_unit {
            0
        } else if coin.denom == self.symbol {
            self.scale
        } else {
            return Err(self.denom_mismatch(&coin.denom));
        };

        let amount =
            parse_decimal_truncated(&coin.amount, scale).map_err(RegistryError::InvalidArgument)?;
        Ok(Coin::new(&self.min_unit, amount))
    }

    fn denom_mismatch(&self, denom: &str) -> RegistryError {
        RegistryError::NotFound(format!(
            "denom {} does not match token {} ({})",
            denom, self.symbol, self.min_unit
        ))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token:\n  Name:              {}\n  Symbol:            {}\n  Scale:             {}\n  MinUnit:           {}\n  Initial Supply:    {}\n  Max Supply:        {}\n  Mintable:          {}\n  Owner:             {}",
            self.name,
            self.symbol,
            self.scale,
            self.min_unit,
            self.initial_supply,
            self.max_supply,
            self.mintable,
            self.owner
        )
    }
}
