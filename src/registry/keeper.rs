//! Registry state transitions
//!
//! Every operation validates fully before touching state. Store writes go to
//! an overlay whose change set is committed only after the ledger calls of
//! the same operation succeeded, so a failed operation leaves no record or
//! index behind.

use crate::config::RegistryConfig;
use crate::core::coin::Coin;
use crate::core::error::{RegistryError, RegistryResult};
use crate::core::fee::FeeCurve;
use crate::core::params::{Params, VersionedParams};
use crate::ledger::{BalanceLedger, Bank, LedgerError, Permission};
use crate::storage::kv::{KvStore, MemStore};
use crate::storage::token_store::TokenStore;
use crate::token::{MsgEditToken, MsgIssueToken, MsgMintToken, MsgTransferTokenOwner, Token};

/// Registry over the in-memory store and bank
pub type MemRegistry = Registry<MemStore, Bank>;

/// The token registry: entity store, balance ledger and configuration
#[derive(Debug)]
pub struct Registry<S: KvStore = MemStore, L: BalanceLedger = Bank> {
    pub(crate) store: TokenStore<S>,
    pub(crate) ledger: L,
    config: RegistryConfig,
    fee_curve: FeeCurve,
}

impl<S: KvStore, L: BalanceLedger> Registry<S, L> {
    pub fn new(kv: S, ledger: L, config: RegistryConfig) -> Self {
        let fee_curve = config.fee_curve();
        Self {
            store: TokenStore::new(kv),
            ledger,
            config,
            fee_curve,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn fee_curve(&self) -> &FeeCurve {
        &self.fee_curve
    }

    pub fn store(&self) -> &TokenStore<S> {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_parts(self) -> (S, L) {
        (self.store.into_inner(), self.ledger)
    }

    /// Name of the pool that mints supply and collects fees
    pub(crate) fn module_pool(&self) -> &str {
        &self.config.module_name
    }

    // =========================================================================
    // Params
    // =========================================================================

    /// Current params, falling back to the defaults for the native token
    pub fn get_params(&self) -> RegistryResult<Params> {
        Ok(self.versioned_params()?.params)
    }

    pub fn versioned_params(&self) -> RegistryResult<VersionedParams> {
        Ok(self.store.params()?.unwrap_or_else(|| VersionedParams {
            version: 0,
            params: Params::for_native_token(&self.config.native_token),
        }))
    }

    /// Replace the params, returning the new version
    pub fn set_params(&mut self, params: Params) -> RegistryResult<u64> {
        params.validate()?;

        let next = self.versioned_params()?.next(params);
        self.store.set_params(&next)?;
        log::info!("Params updated to version {}", next.version);
        Ok(next.version)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Whether `denom` is taken as a symbol or min unit
    pub fn has_token(&self, denom: &str) -> bool {
        self.store.has(denom)
    }

    /// Token by symbol or min unit
    pub fn get_token(&self, denom: &str) -> RegistryResult<Token> {
        self.store.get(denom)
    }

    /// All tokens, or those owned by `owner`, in symbol order
    pub fn get_tokens(&self, owner: Option<&str>) -> RegistryResult<Vec<Token>> {
        match owner {
            Some(owner) => self.store.tokens_by_owner(owner),
            None => self.store.tokens().collect(),
        }
    }

    /// Atomic supply of `token` currently outstanding on the ledger
    pub fn outstanding_supply(&self, token: &Token) -> u128 {
        self.ledger.total_supply_of(&token.min_unit)
    }

    fn owned_token(&self, symbol: &str, caller: &str) -> RegistryResult<Token> {
        let token = self.store.get_by_symbol(symbol)?;
        if token.owner != caller {
            return Err(RegistryError::Unauthorized {
                caller: caller.to_string(),
                symbol: token.symbol,
            });
        }
        Ok(token)
    }

    pub(crate) fn require_pool(&self, permission: Permission) -> RegistryResult<()> {
        let pool = self.module_pool();
        if !self.ledger.has_permission(pool, permission) {
            return Err(LedgerError::PermissionDenied {
                pool: pool.to_string(),
                permission,
            }
            .into());
        }
        Ok(())
    }

    /// Mint `amount` main units of `token` through the module pool to `recipient`
    fn mint_to(&mut self, token: &Token, amount: u64, recipient: &str) -> RegistryResult<Coin> {
        let coin = Coin::new(token.min_unit.clone(), token.to_min_unit(amount));
        let pool = self.config.module_name.clone();

        self.ledger.mint(&pool, &coin)?;
        self.ledger.send_from_pool_to_account(&pool, recipient, &coin)?;
        Ok(coin)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Register a new token and mint its initial supply to the owner
    pub fn issue_token(&mut self, msg: &MsgIssueToken) -> RegistryResult<Token> {
        msg.validate_basic()?;
        let token = msg.to_token();

        let changes = {
            let mut batch = self.store.begin();
            batch.add_token(&token)?;
            batch.into_inner().into_changes()
        };

        let fee = self.token_issue_fee(&token.symbol)?;
        self.ensure_fee_payable(&token.owner, &fee)?;
        if token.initial_supply > 0 {
            self.require_pool(Permission::Minter)?;
        }

        self.deduct_fee(&token.owner, &fee)?;
        if token.initial_supply > 0 {
            self.mint_to(&token, token.initial_supply, &token.owner)?;
        }
        self.store.commit(changes);

        log::info!(
            "Issued token {} ({}) with initial supply {} to {}",
            token.symbol,
            token.min_unit,
            token.initial_supply,
            token.owner
        );
        Ok(token)
    }

    /// Update name, max supply and mintability of an owned token
    pub fn edit_token(&mut self, msg: &MsgEditToken) -> RegistryResult<Token> {
        msg.validate_basic()?;
        let mut token = self.owned_token(&msg.symbol, &msg.owner)?;

        if msg.max_supply > 0 {
            let outstanding = self.outstanding_supply(&token);
            if token.to_min_unit(msg.max_supply) < outstanding {
                return Err(RegistryError::InvalidMaxSupply(format!(
                    "max supply {} must not be less than the issued amount {}{}",
                    msg.max_supply, outstanding, token.min_unit
                )));
            }
            if msg.max_supply < token.initial_supply {
                return Err(RegistryError::InvalidMaxSupply(format!(
                    "max supply {} must not be less than the initial supply {}",
                    msg.max_supply, token.initial_supply
                )));
            }
            token.max_supply = msg.max_supply;
        }
        if let Some(name) = msg.new_name() {
            token.name = name.to_string();
        }
        if let Some(mintable) = msg.mintable {
            token.mintable = mintable;
        }

        let changes = {
            let mut batch = self.store.begin();
            batch.put(&token)?;
            batch.into_inner().into_changes()
        };
        self.store.commit(changes);

        log::info!("Edited token {}", token.symbol);
        Ok(token)
    }

    /// Mint more of a mintable token, up to its max supply
    pub fn mint_token(&mut self, msg: &MsgMintToken) -> RegistryResult<Coin> {
        msg.validate_basic()?;
        let token = self.owned_token(&msg.symbol, &msg.owner)?;

        if !token.mintable {
            return Err(RegistryError::NotMintable(token.symbol));
        }

        let outstanding = self.outstanding_supply(&token);
        let mintable_amount =
            token.max_supply_min_units().saturating_sub(outstanding) / token.precision();
        if msg.amount as u128 > mintable_amount {
            return Err(RegistryError::InvalidMaxSupply(format!(
                "the amount exceeds the mintable token amount; expected (0, {}], got {}",
                mintable_amount, msg.amount
            )));
        }

        let fee = self.token_mint_fee(&token.symbol)?;
        self.ensure_fee_payable(&msg.owner, &fee)?;
        self.require_pool(Permission::Minter)?;

        self.deduct_fee(&msg.owner, &fee)?;
        let minted = self.mint_to(&token, msg.amount, msg.recipient())?;

        log::info!("Minted {} to {}", minted, msg.recipient());
        Ok(minted)
    }

    /// Hand an owned token to a new owner
    pub fn transfer_token_owner(&mut self, msg: &MsgTransferTokenOwner) -> RegistryResult<Token> {
        msg.validate_basic()?;
        let mut token = self.owned_token(&msg.symbol, &msg.src_owner)?;

        token.owner = msg.dst_owner.clone();

        let changes = {
            let mut batch = self.store.begin();
            batch.put(&token)?;
            batch.move_owner_index(&token.symbol, &msg.src_owner, &msg.dst_owner);
            batch.into_inner().into_changes()
        };
        self.store.commit(changes);

        log::info!(
            "Transferred ownership of {} from {} to {}",
            token.symbol,
            msg.src_owner,
            msg.dst_owner
        );
        Ok(token)
    }
}
