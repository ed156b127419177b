//! Balance ledger
//!
//! The registry never moves funds itself. Minting, burning and transfers all
//! go through a [`BalanceLedger`], which is the only authority on balances and
//! supplies. [`Bank`] is the in-process implementation used by the CLI and
//! the tests.
//!
//! Pools are named module accounts. Each pool has a deterministic address
//! derived from its name and a set of permissions deciding whether it may
//! mint or burn.

pub mod bank;

pub use bank::Bank;

use crate::core::coin::Coin;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

/// Ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: {account} has {have}{denom}, needs {need}{denom}")]
    InsufficientBalance {
        account: String,
        denom: String,
        have: u128,
        need: u128,
    },
    #[error("Unknown pool: {0}")]
    UnknownPool(String),
    #[error("Pool {pool} lacks the {permission} permission")]
    PermissionDenied { pool: String, permission: Permission },
    #[error("Supply overflow for {0}")]
    SupplyOverflow(String),
    #[error("Invalid coin: {0}")]
    InvalidCoin(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// What a pool is allowed to do besides holding funds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Minter,
    Burner,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Minter => write!(f, "minter"),
            Permission::Burner => write!(f, "burner"),
        }
    }
}

/// Deterministic account address of the pool called `name`
///
/// First 20 bytes of SHA-256 over the name, hex encoded.
pub fn module_address(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..20])
}

/// Fungible balance operations the registry depends on
///
/// All amounts are in min units. Every method either applies completely or
/// returns an error without changing any balance.
pub trait BalanceLedger {
    /// Create `coin` out of nothing in `pool`
    fn mint(&mut self, pool: &str, coin: &Coin) -> LedgerResult<()>;

    /// Destroy `coin` held by `pool`
    fn burn(&mut self, pool: &str, coin: &Coin) -> LedgerResult<()>;

    fn send_from_account_to_account(
        &mut self,
        from: &str,
        to: &str,
        coin: &Coin,
    ) -> LedgerResult<()>;

    fn send_from_account_to_pool(
        &mut self,
        from: &str,
        pool: &str,
        coin: &Coin,
    ) -> LedgerResult<()>;

    fn send_from_pool_to_account(&mut self, pool: &str, to: &str, coin: &Coin) -> LedgerResult<()>;

    fn send_from_pool_to_pool(&mut self, from: &str, to: &str, coin: &Coin) -> LedgerResult<()>;

    /// Outstanding supply of `denom` across all accounts
    fn total_supply_of(&self, denom: &str) -> u128;

    /// Every non-zero balance held by `account`
    fn spendable_balance(&self, account: &str) -> BTreeMap<String, u128>;

    fn balance_of(&self, account: &str, denom: &str) -> u128 {
        self.spendable_balance(account)
            .get(denom)
            .copied()
            .unwrap_or(0)
    }

    /// Whether `pool` is registered
    fn has_pool(&self, pool: &str) -> bool;

    /// Whether `pool` exists and holds `permission`
    fn has_permission(&self, pool: &str, permission: Permission) -> bool;

    /// Address of a registered pool
    fn pool_address(&self, pool: &str) -> LedgerResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_address() {
        let address = module_address("token");
        assert_eq!(address.len(), 40);
        assert_eq!(address, module_address("token"));
        assert_ne!(address, module_address("fee_collector"));
    }
}
