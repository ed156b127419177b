//! In-memory bank
//!
//! Tracks balances per address and supply per denom. Pool names resolve to
//! their module addresses, so pool funds are ordinary balances that only
//! pool operations can reach by name.

use crate::core::coin::Coin;
use crate::ledger::{module_address, BalanceLedger, LedgerError, LedgerResult, Permission};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A registered pool account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAccount {
    pub address: String,
    pub permissions: BTreeSet<Permission>,
}

/// Balances, supplies and pools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    balances: BTreeMap<String, BTreeMap<String, u128>>,
    supply: BTreeMap<String, u128>,
    pools: BTreeMap<String, PoolAccount>,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Bank::register_pool`]
    pub fn with_pool(mut self, name: &str, permissions: &[Permission]) -> Self {
        self.register_pool(name, permissions);
        self
    }

    /// Register `name` as a pool, replacing its permissions if already known
    pub fn register_pool(&mut self, name: &str, permissions: &[Permission]) {
        self.pools.insert(
            name.to_string(),
            PoolAccount {
                address: module_address(name),
                permissions: permissions.iter().copied().collect(),
            },
        );
    }

    pub fn pools(&self) -> impl Iterator<Item = (&String, &PoolAccount)> {
        self.pools.iter()
    }

    /// Create `coin` directly in `account`, used to fund accounts at genesis
    pub fn fund(&mut self, account: &str, coin: &Coin) -> LedgerResult<()> {
        check_coin(coin)?;
        let supply = self.supply_after_mint(coin)?;
        let balance = self.balance_after_credit(account, coin)?;

        self.supply.insert(coin.denom.clone(), supply);
        self.set_balance(account, &coin.denom, balance);
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn pool(&self, name: &str) -> LedgerResult<&PoolAccount> {
        self.pools
            .get(name)
            .ok_or_else(|| LedgerError::UnknownPool(name.to_string()))
    }

    fn require(&self, name: &str, permission: Permission) -> LedgerResult<String> {
        let pool = self.pool(name)?;
        if !pool.permissions.contains(&permission) {
            return Err(LedgerError::PermissionDenied {
                pool: name.to_string(),
                permission,
            });
        }
        Ok(pool.address.clone())
    }

    fn balance(&self, address: &str, denom: &str) -> u128 {
        self.balances
            .get(address)
            .and_then(|coins| coins.get(denom))
            .copied()
            .unwrap_or(0)
    }

    fn set_balance(&mut self, address: &str, denom: &str, amount: u128) {
        if amount == 0 {
            if let Some(coins) = self.balances.get_mut(address) {
                coins.remove(denom);
                if coins.is_empty() {
                    self.balances.remove(address);
                }
            }
            return;
        }

        self.balances
            .entry(address.to_string())
            .or_default()
            .insert(denom.to_string(), amount);
    }

    fn balance_after_debit(&self, address: &str, coin: &Coin) -> LedgerResult<u128> {
        let have = self.balance(address, &coin.denom);
        have.checked_sub(coin.amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                account: address.to_string(),
                denom: coin.denom.clone(),
                have,
                need: coin.amount,
            })
    }

    fn balance_after_credit(&self, address: &str, coin: &Coin) -> LedgerResult<u128> {
        self.balance(address, &coin.denom)
            .checked_add(coin.amount)
            .ok_or_else(|| LedgerError::SupplyOverflow(coin.denom.clone()))
    }

    fn supply_after_mint(&self, coin: &Coin) -> LedgerResult<u128> {
        self.total_supply_of(&coin.denom)
            .checked_add(coin.amount)
            .ok_or_else(|| LedgerError::SupplyOverflow(coin.denom.clone()))
    }

    /// Move `coin` between two addresses, all or nothing
    fn transfer(&mut self, from: &str, to: &str, coin: &Coin) -> LedgerResult<()> {
        check_coin(coin)?;
        let from_balance = self.balance_after_debit(from, coin)?;
        if from == to || coin.amount == 0 {
            return Ok(());
        }
        let to_balance = self.balance_after_credit(to, coin)?;

        self.set_balance(from, &coin.denom, from_balance);
        self.set_balance(to, &coin.denom, to_balance);
        Ok(())
    }
}

fn check_coin(coin: &Coin) -> LedgerResult<()> {
    if coin.denom.trim().is_empty() {
        return Err(LedgerError::InvalidCoin(format!("{} has no denom", coin)));
    }
    Ok(())
}

impl BalanceLedger for Bank {
    fn mint(&mut self, pool: &str, coin: &Coin) -> LedgerResult<()> {
        let address = self.require(pool, Permission::Minter)?;
        check_coin(coin)?;
        let supply = self.supply_after_mint(coin)?;
        let balance = self.balance_after_credit(&address, coin)?;

        self.supply.insert(coin.denom.clone(), supply);
        self.set_balance(&address, &coin.denom, balance);
        log::debug!("Minted {} into pool {}", coin, pool);
        Ok(())
    }

    fn burn(&mut self, pool: &str, coin: &Coin) -> LedgerResult<()> {
        let address = self.require(pool, Permission::Burner)?;
        check_coin(coin)?;
        let balance = self.balance_after_debit(&address, coin)?;
        let supply = self.total_supply_of(&coin.denom).saturating_sub(coin.amount);

        self.set_balance(&address, &coin.denom, balance);
        if supply == 0 {
            self.supply.remove(&coin.denom);
        } else {
            self.supply.insert(coin.denom.clone(), supply);
        }
        log::debug!("Burned {} from pool {}", coin, pool);
        Ok(())
    }

    fn send_from_account_to_account(
        &mut self,
        from: &str,
        to: &str,
        coin: &Coin,
    ) -> LedgerResult<()> {
        self.transfer(from, to, coin)
    }

    fn send_from_account_to_pool(
        &mut self,
        from: &str,
        pool: &str,
        coin: &Coin,
    ) -> LedgerResult<()> {
        let to = self.pool(pool)?.address.clone();
        self.transfer(from, &to, coin)
    }

    fn send_from_pool_to_account(&mut self, pool: &str, to: &str, coin: &Coin) -> LedgerResult<()> {
        let from = self.pool(pool)?.address.clone();
        self.transfer(&from, to, coin)
    }

    fn send_from_pool_to_pool(&mut self, from: &str, to: &str, coin: &Coin) -> LedgerResult<()> {
        let from = self.pool(from)?.address.clone();
        let to = self.pool(to)?.address.clone();
        self.transfer(&from, &to, coin)
    }

    fn total_supply_of(&self, denom: &str) -> u128 {
        self.supply.get(denom).copied().unwrap_or(0)
    }

    fn spendable_balance(&self, account: &str) -> BTreeMap<String, u128> {
        self.balances.get(account).cloned().unwrap_or_default()
    }

    fn balance_of(&self, account: &str, denom: &str) -> u128 {
        self.balance(account, denom)
    }

    fn has_pool(&self, pool: &str) -> bool {
        self.pools.contains_key(pool)
    }

    fn has_permission(&self, pool: &str, permission: Permission) -> bool {
        self.pools
            .get(pool)
            .is_some_and(|p| p.permissions.contains(&permission))
    }

    fn pool_address(&self, pool: &str) -> LedgerResult<String> {
        Ok(self.pool(pool)?.address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_bank() -> Bank {
        Bank::new()
            .with_pool("token", &[Permission::Minter, Permission::Burner])
            .with_pool("fee_collector", &[])
    }

    #[test]
    fn test_mint_and_send() {
        let mut bank = create_test_bank();
        let coin = Coin::new("satoshi", 1_000);

        bank.mint("token", &coin).unwrap();
        assert_eq!(bank.total_supply_of("satoshi"), 1_000);

        bank.send_from_pool_to_account("token", "alice", &coin).unwrap();
        assert_eq!(bank.balance_of("alice", "satoshi"), 1_000);
        assert_eq!(bank.balance_of(&module_address("token"), "satoshi"), 0);
        assert_eq!(bank.total_supply_of("satoshi"), 1_000);
    }

    #[test]
    fn test_permissions() {
        let mut bank = create_test_bank();
        let coin = Coin::new("ustake", 10);

        assert!(matches!(
            bank.mint("fee_collector", &coin),
            Err(LedgerError::PermissionDenied { .. })
        ));
        assert!(matches!(bank.mint("nobody", &coin), Err(LedgerError::UnknownPool(_))));
        assert!(bank.has_permission("token", Permission::Burner));
        assert!(!bank.has_permission("fee_collector", Permission::Burner));
        assert!(bank.has_pool("fee_collector"));
        assert!(!bank.has_pool("nobody"));
    }

    #[test]
    fn test_insufficient_balance_leaves_state() {
        let mut bank = create_test_bank();
        bank.fund("alice", &Coin::new("ustake", 5)).unwrap();
        let before = bank.clone();

        let result = bank.send_from_account_to_pool("alice", "token", &Coin::new("ustake", 6));
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { have: 5, need: 6, .. })));
        assert_eq!(bank, before);
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut bank = create_test_bank();
        bank.fund("alice", &Coin::new("ustake", 100)).unwrap();

        bank.send_from_account_to_pool("alice", "token", &Coin::new("ustake", 100)).unwrap();
        bank.send_from_pool_to_pool("token", "fee_collector", &Coin::new("ustake", 40)).unwrap();
        bank.burn("token", &Coin::new("ustake", 60)).unwrap();

        assert_eq!(bank.total_supply_of("ustake"), 40);
        assert_eq!(bank.balance_of(&module_address("fee_collector"), "ustake"), 40);
        assert!(bank.spendable_balance("alice").is_empty());
    }

    #[test]
    fn test_bank_serialization() {
        let mut bank = create_test_bank();
        bank.fund("alice", &Coin::new("ustake", 7)).unwrap();

        let json = serde_json::to_string(&bank).unwrap();
        let restored: Bank = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, bank);
    }
}
