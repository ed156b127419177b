//! Batch fee admission check
//!
//! Before a batch runs, the issue and mint fees of its leading token messages
//! are summed per payer and compared with what each payer holds. The scan
//! ends at the first message routed elsewhere. Nothing is charged here.

use crate::core::error::{RegistryError, RegistryResult};
use crate::ledger::BalanceLedger;
use crate::registry::keeper::Registry;
use crate::storage::kv::KvStore;
use crate::token::{check_symbol, Msg, ROUTE};
use std::collections::BTreeMap;

impl<S: KvStore, L: BalanceLedger> Registry<S, L> {
    /// Aggregate fee owed by each payer over the leading token messages
    ///
    /// Messages with a malformed symbol are not priced; they fail on their
    /// own when delivered.
    pub fn batch_fees(&self, msgs: &[Msg]) -> RegistryResult<BTreeMap<String, u128>> {
        let mut owed: BTreeMap<String, u128> = BTreeMap::new();

        for msg in msgs {
            // Anything the registry does not execute ends the scan, whatever its route
            if matches!(msg, Msg::Foreign { .. }) || msg.route() != ROUTE {
                break;
            }

            let fee = match msg {
                Msg::IssueToken(m) => {
                    let token = m.to_token();
                    if check_symbol(&token.symbol).is_err() {
                        continue;
                    }
                    self.token_issue_fee(&token.symbol)?
                }
                Msg::MintToken(m) => {
                    if check_symbol(&m.symbol).is_err() {
                        continue;
                    }
                    self.token_mint_fee(&m.symbol)?
                }
                _ => continue,
            };

            let total = owed.entry(msg.signer().to_string()).or_insert(0);
            *total = total.saturating_add(fee.amount);
        }

        Ok(owed)
    }

    /// Reject the batch when any payer cannot cover its aggregate fee
    pub fn check_batch_fees(&self, msgs: &[Msg]) -> RegistryResult<()> {
        let owed = self.batch_fees(msgs)?;
        if owed.is_empty() {
            return Ok(());
        }
        let denom = self.get_params()?.issue_token_base_fee.denom;

        for (payer, need) in owed {
            let have = self.ledger().balance_of(&payer, &denom);
            log::debug!("Fee check for {}: needs {}{}, has {}{}", payer, need, denom, have, denom);
            if have < need {
                return Err(RegistryError::InsufficientFunds {
                    payer,
                    denom,
                    have,
                    need,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::error::RegistryError;
    use crate::registry::keeper::tests::{create_test_registry, ALICE, BOB};
    use crate::token::{Msg, MsgEditToken, MsgIssueToken, MsgMintToken, ROUTE};

    fn issue(symbol: &str, owner: &str) -> Msg {
        let min_unit = format!("u{}", symbol);
        Msg::IssueToken(MsgIssueToken::new(symbol, &min_unit, "T", 0, 1, 10, true, owner))
    }

    fn foreign() -> Msg {
        Msg::Foreign {
            route: "bank".to_string(),
            signer: ALICE.to_string(),
        }
    }

    #[test]
    fn test_aggregates_per_payer() {
        let registry = create_test_registry(&[]);
        let msgs = vec![
            issue("abc", ALICE),
            Msg::MintToken(MsgMintToken::new("abc", ALICE, None, 1)),
            Msg::EditToken(MsgEditToken::new("", "abc", 0, None, ALICE)),
            issue("bitcoins", BOB),
        ];

        let owed = registry.batch_fees(&msgs).unwrap();
        assert_eq!(owed.get(ALICE), Some(&66_000));
        assert_eq!(owed.get(BOB), Some(&4_672));
    }

    #[test]
    fn test_scan_stops_at_foreign_route() {
        let registry = create_test_registry(&[]);
        let msgs = vec![issue("abc", ALICE), foreign(), issue("xyz", BOB)];

        let owed = registry.batch_fees(&msgs).unwrap();
        assert_eq!(owed.len(), 1);
        assert!(owed.get(BOB).is_none());

        let msgs = vec![foreign(), issue("abc", ALICE)];
        assert!(registry.batch_fees(&msgs).unwrap().is_empty());
    }

    #[test]
    fn test_scan_stops_at_foreign_msg_on_token_route() {
        let registry = create_test_registry(&[]);
        let disguised = Msg::Foreign {
            route: ROUTE.to_string(),
            signer: ALICE.to_string(),
        };
        let msgs = vec![issue("abc", ALICE), disguised, issue("xyz", BOB)];

        let owed = registry.batch_fees(&msgs).unwrap();
        assert_eq!(owed.get(ALICE), Some(&60_000));
        assert!(owed.get(BOB).is_none());
    }

    #[test]
    fn test_insufficient_aggregate() {
        // Enough for either issue alone, not for both
        let registry = create_test_registry(&[(ALICE, 100_000)]);
        assert!(registry.check_batch_fees(&[issue("abc", ALICE)]).is_ok());

        let result = registry.check_batch_fees(&[issue("abc", ALICE), issue("xyz", ALICE)]);
        assert!(matches!(
            result,
            Err(RegistryError::InsufficientFunds { have: 100_000, need: 120_000, .. })
        ));
    }

    #[test]
    fn test_malformed_symbol_not_priced() {
        let registry = create_test_registry(&[]);
        let owed = registry.batch_fees(&[issue("a", ALICE)]).unwrap();
        assert!(owed.is_empty());
    }
}
