//! Core registry values
//!
//! This module contains the building blocks shared by every other module:
//! - Coins (integer ledger amounts and decimal main-unit amounts)
//! - Errors (the registry error taxonomy)
//! - Fee curve (symbol-length pricing and the tax/burn split)
//! - Params (rates, base fee and their versioned storage form)

pub mod coin;
pub mod error;
pub mod fee;
pub mod params;

pub use coin::{format_decimal, parse_decimal, pow10, Coin, DecCoin};
pub use error::{RegistryError, RegistryResult};
pub use fee::{split_fee, FeeCurve, FeeSplit, TokenFees, DEFAULT_POWER_REDUCTION};
pub use params::{Params, Rate, VersionedParams, DEFAULT_ISSUE_BASE_FEE};
