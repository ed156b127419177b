//! Genesis import and export

use crate::config::RegistryConfig;
use crate::core::error::{RegistryError, RegistryResult};
use crate::core::params::{Params, VersionedParams};
use crate::ledger::BalanceLedger;
use crate::registry::keeper::Registry;
use crate::storage::kv::KvStore;
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Registry state at chain start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub tokens: Vec<Token>,
}

/// Default params and the configured native token
pub fn default_genesis(config: &RegistryConfig) -> GenesisState {
    GenesisState {
        params: Params::for_native_token(&config.native_token),
        tokens: vec![config.native_token.clone()],
    }
}

/// Check params, every token, and that no two tokens share a denom
pub fn validate_genesis(state: &GenesisState) -> RegistryResult<()> {
    state.params.validate()?;

    let mut denoms = BTreeSet::new();
    for token in &state.tokens {
        token.validate()?;

        if !denoms.insert(token.symbol.as_str()) {
            return Err(RegistryError::AlreadyExists(format!(
                "symbol {} is declared twice",
                token.symbol
            )));
        }
        if token.min_unit != token.symbol && !denoms.insert(token.min_unit.as_str()) {
            return Err(RegistryError::AlreadyExists(format!(
                "min unit {} is declared twice",
                token.min_unit
            )));
        }
    }

    Ok(())
}

impl<S: KvStore, L: BalanceLedger> Registry<S, L> {
    /// Load params and tokens; balances are the ledger's own genesis
    ///
    /// Either every token is stored or none is.
    pub fn init_genesis(&mut self, state: &GenesisState) -> RegistryResult<()> {
        validate_genesis(state)?;

        let version = self.versioned_params()?.next(state.params.clone());
        let changes = {
            let mut batch = self.store.begin();
            batch.set_params(&version)?;
            for token in &state.tokens {
                batch.add_token(token)?;
            }
            batch.into_inner().into_changes()
        };
        self.store.commit(changes);

        log::info!("Initialized genesis with {} tokens", state.tokens.len());
        Ok(())
    }

    /// Current params and every token in symbol order
    pub fn export_genesis(&self) -> RegistryResult<GenesisState> {
        Ok(GenesisState {
            params: self.get_params()?,
            tokens: self.get_tokens(None)?,
        })
    }

    /// Restore params with an explicit version, used when reloading state
    pub(crate) fn restore_params(&mut self, params: VersionedParams) -> RegistryResult<()> {
        params.params.validate()?;
        self.store.set_params(&params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Bank;
    use crate::registry::keeper::tests::{btc_msg, create_test_registry, ALICE};
    use crate::storage::kv::MemStore;

    #[test]
    fn test_default_genesis() {
        let config = RegistryConfig::default();
        let state = default_genesis(&config);

        assert!(validate_genesis(&state).is_ok());
        assert_eq!(state.tokens, vec![config.native_token.clone()]);
        assert_eq!(state.params.issue_token_base_fee.denom, "ustake");
    }

    #[test]
    fn test_init_genesis() {
        let config = RegistryConfig::default();
        let mut registry = Registry::new(MemStore::new(), Bank::new(), config.clone());

        registry.init_genesis(&default_genesis(&config)).unwrap();
        assert!(registry.has_token("stake"));
        assert!(registry.has_token("ustake"));
        assert_eq!(registry.versioned_params().unwrap().version, 1);
        // Nothing minted
        assert_eq!(registry.ledger().total_supply_of("ustake"), 0);
    }

    #[test]
    fn test_duplicate_denoms_rejected() {
        let config = RegistryConfig::default();
        let mut state = default_genesis(&config);
        let mut clash = config.native_token.clone();
        clash.symbol = "ustake".to_string();
        clash.min_unit = "ustk".to_string();
        state.tokens.push(clash);

        assert!(matches!(
            validate_genesis(&state),
            Err(RegistryError::AlreadyExists(_))
        ));

        let mut registry = Registry::new(MemStore::new(), Bank::new(), config);
        assert!(registry.init_genesis(&state).is_err());
        assert!(!registry.has_token("stake"));
    }

    #[test]
    fn test_export_import() {
        let mut registry = create_test_registry(&[(ALICE, 1_000_000)]);
        registry.issue_token(&btc_msg(ALICE)).unwrap();
        let exported = registry.export_genesis().unwrap();
        assert_eq!(exported.tokens.len(), 1);

        let mut restored = Registry::new(MemStore::new(), Bank::new(), registry.config().clone());
        restored.init_genesis(&exported).unwrap();
        assert_eq!(restored.export_genesis().unwrap(), exported);
    }
}
