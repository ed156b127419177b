//! Read-only queries
//!
//! Inputs are normalized the way messages are, so `BTC` finds `btc`.

use crate::core::error::RegistryResult;
use crate::core::fee::TokenFees;
use crate::core::params::Params;
use crate::ledger::BalanceLedger;
use crate::registry::keeper::Registry;
use crate::storage::kv::KvStore;
use crate::token::{check_symbol, normalize_denom, Token};

impl<S: KvStore, L: BalanceLedger> Registry<S, L> {
    /// Token by symbol or min unit
    pub fn query_token(&self, denom: &str) -> RegistryResult<Token> {
        self.get_token(&normalize_denom(denom))
    }

    /// All tokens, or those of one owner; an empty owner means all
    pub fn query_tokens(&self, owner: Option<&str>) -> RegistryResult<Vec<Token>> {
        let owner = owner.map(str::trim).filter(|o| !o.is_empty());
        self.get_tokens(owner)
    }

    /// Issue and mint fees for `symbol`, and whether it is taken
    pub fn query_fees(&self, symbol: &str) -> RegistryResult<TokenFees> {
        let symbol = normalize_denom(symbol);
        check_symbol(&symbol)?;

        Ok(TokenFees {
            exist: self.has_token(&symbol),
            issue_fee: self.token_issue_fee(&symbol)?,
            mint_fee: self.token_mint_fee(&symbol)?,
        })
    }

    pub fn query_params(&self) -> RegistryResult<Params> {
        self.get_params()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::coin::Coin;
    use crate::core::error::RegistryError;
    use crate::registry::keeper::tests::{btc_msg, create_test_registry, ALICE, BOB};

    #[test]
    fn test_query_token() {
        let mut registry = create_test_registry(&[(ALICE, 1_000_000)]);
        registry.issue_token(&btc_msg(ALICE)).unwrap();

        assert_eq!(registry.query_token(" BTC ").unwrap().symbol, "btc");
        assert_eq!(registry.query_token("Satoshi").unwrap().symbol, "btc");
        assert!(matches!(registry.query_token("eth"), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn test_query_tokens() {
        let mut registry = create_test_registry(&[(ALICE, 1_000_000)]);
        registry.issue_token(&btc_msg(ALICE)).unwrap();

        assert_eq!(registry.query_tokens(None).unwrap().len(), 1);
        assert_eq!(registry.query_tokens(Some("")).unwrap().len(), 1);
        assert_eq!(registry.query_tokens(Some(ALICE)).unwrap().len(), 1);
        assert!(registry.query_tokens(Some(BOB)).unwrap().is_empty());
    }

    #[test]
    fn test_query_fees() {
        let mut registry = create_test_registry(&[(ALICE, 1_000_000)]);

        let fees = registry.query_fees("BTC").unwrap();
        assert!(!fees.exist);
        assert_eq!(fees.issue_fee, Coin::new("ustake", 60_000));
        assert_eq!(fees.mint_fee, Coin::new("ustake", 6_000));

        registry.issue_token(&btc_msg(ALICE)).unwrap();
        assert!(registry.query_fees("btc").unwrap().exist);

        assert!(matches!(
            registry.query_fees("b!"),
            Err(RegistryError::InvalidArgument(_))
        ));
    }
}
