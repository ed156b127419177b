//! Fee pricing and collection
//!
//! Fees are paid in the denom of the issuance base fee. A collected fee moves
//! from the payer into the module pool; the community tax goes on to the fee
//! collector and the rest is burned.

use crate::core::coin::Coin;
use crate::core::error::{RegistryError, RegistryResult};
use crate::core::fee::split_fee;
use crate::ledger::{BalanceLedger, LedgerError, Permission};
use crate::registry::keeper::Registry;
use crate::storage::kv::KvStore;
use crate::token::check_symbol;

impl<S: KvStore, L: BalanceLedger> Registry<S, L> {
    /// Fee for issuing a token with `symbol`
    pub fn token_issue_fee(&self, symbol: &str) -> RegistryResult<Coin> {
        check_symbol(symbol)?;
        let params = self.get_params()?;
        let base = &params.issue_token_base_fee;

        Ok(Coin::new(
            base.denom.clone(),
            self.fee_curve().issue_fee(symbol, base.amount),
        ))
    }

    /// Fee for minting more of the token with `symbol`
    pub fn token_mint_fee(&self, symbol: &str) -> RegistryResult<Coin> {
        check_symbol(symbol)?;
        let params = self.get_params()?;
        let base = &params.issue_token_base_fee;

        Ok(Coin::new(
            base.denom.clone(),
            self.fee_curve().mint_fee(symbol, base.amount, params.mint_token_fee_ratio),
        ))
    }

    /// Charge `payer` the issuance fee for `symbol`
    pub fn deduct_issue_fee(&mut self, payer: &str, symbol: &str) -> RegistryResult<Coin> {
        let fee = self.token_issue_fee(symbol)?;
        self.ensure_fee_payable(payer, &fee)?;
        self.deduct_fee(payer, &fee)?;
        Ok(fee)
    }

    /// Charge `payer` the minting fee for `symbol`
    pub fn deduct_mint_fee(&mut self, payer: &str, symbol: &str) -> RegistryResult<Coin> {
        let fee = self.token_mint_fee(symbol)?;
        self.ensure_fee_payable(payer, &fee)?;
        self.deduct_fee(payer, &fee)?;
        Ok(fee)
    }

    /// Fail with `InsufficientFunds` unless `payer` can cover `fee`, and make
    /// sure every pool the fee passes through exists with the rights it needs
    pub(crate) fn ensure_fee_payable(&self, payer: &str, fee: &Coin) -> RegistryResult<()> {
        let have = self.ledger().balance_of(payer, &fee.denom);
        if have < fee.amount {
            return Err(RegistryError::InsufficientFunds {
                payer: payer.to_string(),
                denom: fee.denom.clone(),
                have,
                need: fee.amount,
            });
        }

        let tax_rate = self.get_params()?.token_tax_rate;
        let split = split_fee(fee.amount, tax_rate);
        self.require_registered(self.module_pool())?;
        if split.community_tax > 0 {
            self.require_registered(&self.config().fee_collector_name)?;
        }
        if split.burned > 0 {
            self.require_pool(Permission::Burner)?;
        }
        Ok(())
    }

    fn require_registered(&self, pool: &str) -> RegistryResult<()> {
        if !self.ledger().has_pool(pool) {
            return Err(LedgerError::UnknownPool(pool.to_string()).into());
        }
        Ok(())
    }

    /// Move `fee` from `payer` into the pools and burn the untaxed share
    pub(crate) fn deduct_fee(&mut self, payer: &str, fee: &Coin) -> RegistryResult<()> {
        let tax_rate = self.get_params()?.token_tax_rate;
        let split = split_fee(fee.amount, tax_rate);
        let pool = self.config().module_name.clone();
        let collector = self.config().fee_collector_name.clone();

        self.ledger.send_from_account_to_pool(payer, &pool, fee)?;
        if split.community_tax > 0 {
            self.ledger.send_from_pool_to_pool(
                &pool,
                &collector,
                &Coin::new(fee.denom.clone(), split.community_tax),
            )?;
        }
        if split.burned > 0 {
            self.ledger.burn(&pool, &Coin::new(fee.denom.clone(), split.burned))?;
        }

        log::debug!(
            "Collected fee {} from {}: {} to {}, {} burned",
            fee,
            payer,
            split.community_tax,
            collector,
            split.burned
        );
        Ok(())
    }
}
