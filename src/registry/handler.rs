//! Message dispatch and batch delivery

use crate::core::error::{RegistryError, RegistryResult};
use crate::ledger::BalanceLedger;
use crate::registry::keeper::Registry;
use crate::storage::kv::KvStore;
use crate::token::msgs::{
    TYPE_MSG_EDIT_TOKEN, TYPE_MSG_ISSUE_TOKEN, TYPE_MSG_MINT_TOKEN, TYPE_MSG_TRANSFER_TOKEN_OWNER,
};
use crate::token::Msg;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ATTRIBUTE_KEY_SYMBOL: &str = "symbol";
pub const ATTRIBUTE_KEY_OWNER: &str = "owner";
pub const ATTRIBUTE_KEY_DST_OWNER: &str = "dst_owner";
pub const ATTRIBUTE_KEY_AMOUNT: &str = "amount";
pub const ATTRIBUTE_KEY_RECIPIENT: &str = "recipient";

// =============================================================================
// Events
// =============================================================================

/// Record of a successful operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    /// First value recorded under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for (key, value) in &self.attributes {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// What happened to one message of a batch
#[derive(Debug)]
pub enum MsgOutcome {
    Applied(Event),
    /// Routed to another module, not executed here
    Skipped { route: String },
    Failed(RegistryError),
}

impl MsgOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MsgOutcome::Applied(_))
    }
}

// =============================================================================
// Dispatch
// =============================================================================

impl<S: KvStore, L: BalanceLedger> Registry<S, L> {
    /// Execute one token message
    pub fn handle_msg(&mut self, msg: &Msg) -> RegistryResult<Event> {
        match msg {
            Msg::IssueToken(m) => {
                let token = self.issue_token(m)?;
                Ok(Event::new(TYPE_MSG_ISSUE_TOKEN)
                    .attribute(ATTRIBUTE_KEY_SYMBOL, &token.symbol)
                    .attribute(ATTRIBUTE_KEY_OWNER, &token.owner))
            }
            Msg::EditToken(m) => {
                let token = self.edit_token(m)?;
                Ok(Event::new(TYPE_MSG_EDIT_TOKEN)
                    .attribute(ATTRIBUTE_KEY_SYMBOL, &token.symbol)
                    .attribute(ATTRIBUTE_KEY_OWNER, &token.owner))
            }
            Msg::MintToken(m) => {
                let minted = self.mint_token(m)?;
                Ok(Event::new(TYPE_MSG_MINT_TOKEN)
                    .attribute(ATTRIBUTE_KEY_SYMBOL, &m.symbol)
                    .attribute(ATTRIBUTE_KEY_AMOUNT, minted)
                    .attribute(ATTRIBUTE_KEY_RECIPIENT, m.recipient()))
            }
            Msg::TransferTokenOwner(m) => {
                let token = self.transfer_token_owner(m)?;
                Ok(Event::new(TYPE_MSG_TRANSFER_TOKEN_OWNER)
                    .attribute(ATTRIBUTE_KEY_SYMBOL, &token.symbol)
                    .attribute(ATTRIBUTE_KEY_OWNER, &m.src_owner)
                    .attribute(ATTRIBUTE_KEY_DST_OWNER, &token.owner))
            }
            Msg::Foreign { route, .. } => Err(RegistryError::InvalidArgument(format!(
                "unrecognized message route {}",
                route
            ))),
        }
    }

    /// Run a batch in order after checking its aggregate fees
    ///
    /// A fee check failure rejects the whole batch before anything runs.
    /// After that every message succeeds or fails on its own; a failure does
    /// not undo the messages before it.
    pub fn deliver_batch(&mut self, msgs: &[Msg]) -> RegistryResult<Vec<MsgOutcome>> {
        self.check_batch_fees(msgs)?;

        let outcomes = msgs
            .iter()
            .map(|msg| match msg {
                Msg::Foreign { route, .. } => MsgOutcome::Skipped {
                    route: route.clone(),
                },
                _ => match self.handle_msg(msg) {
                    Ok(event) => MsgOutcome::Applied(event),
                    Err(e) => {
                        log::warn!("Message {} failed: {}", msg.type_name(), e);
                        MsgOutcome::Failed(e)
                    }
                },
            })
            .collect();

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::keeper::tests::{btc_msg, create_test_registry, ALICE, BOB};
    use crate::token::{MsgMintToken, MsgTransferTokenOwner};

    #[test]
    fn test_issue_event() {
        let mut registry = create_test_registry(&[(ALICE, 1_000_000)]);

        let event = registry.handle_msg(&Msg::IssueToken(btc_msg(ALICE))).unwrap();
        assert_eq!(event.kind, TYPE_MSG_ISSUE_TOKEN);
        assert_eq!(event.get(ATTRIBUTE_KEY_SYMBOL), Some("btc"));
        assert_eq!(event.get(ATTRIBUTE_KEY_OWNER), Some(ALICE));
        assert_eq!(event.to_string(), "issue_token symbol=btc owner=alice");
    }

    #[test]
    fn test_foreign_msg_is_not_handled() {
        let mut registry = create_test_registry(&[]);
        let msg = Msg::Foreign {
            route: "bank".to_string(),
            signer: ALICE.to_string(),
        };
        assert!(registry.handle_msg(&msg).is_err());
    }

    #[test]
    fn test_deliver_batch() {
        let mut registry = create_test_registry(&[(ALICE, 1_000_000)]);
        let msgs = vec![
            Msg::IssueToken(btc_msg(ALICE)),
            Msg::MintToken(MsgMintToken::new("btc", ALICE, None, 1)),
            Msg::Foreign {
                route: "bank".to_string(),
                signer: ALICE.to_string(),
            },
            Msg::TransferTokenOwner(MsgTransferTokenOwner::new(ALICE, BOB, "btc")),
        ];

        let outcomes = registry.deliver_batch(&msgs).unwrap();
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].is_applied());
        assert!(matches!(outcomes[1], MsgOutcome::Failed(RegistryError::NotMintable(_))));
        assert!(matches!(&outcomes[2], MsgOutcome::Skipped { route } if route == "bank"));
        assert!(outcomes[3].is_applied());

        // Earlier messages stay applied
        assert_eq!(registry.get_token("btc").unwrap().owner, BOB);
    }

    #[test]
    fn test_batch_rejected_by_fee_check() {
        let mut registry = create_test_registry(&[(ALICE, 60_000)]);
        let msgs = vec![
            Msg::IssueToken(btc_msg(ALICE)),
            Msg::MintToken(MsgMintToken::new("btc", ALICE, None, 1)),
        ];

        let result = registry.deliver_batch(&msgs);
        assert!(matches!(result, Err(RegistryError::InsufficientFunds { .. })));
        assert!(!registry.has_token("btc"));
    }
}
