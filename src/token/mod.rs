//! Fungible token records and the operations that change them
//!
//! # Example
//!
//! ```rust
//! use token_registry::token::{MsgIssueToken, Token};
//!
//! let msg = MsgIssueToken::new("btc", "satoshi", "Bitcoin Network", 8, 21_000_000, 0, false, "alice");
//! msg.validate_basic().unwrap();
//!
//! let token: Token = msg.to_token();
//! assert_eq!(token.max_supply, 21_000_000);
//! ```

pub mod msgs;
pub mod token;

pub use msgs::{Msg, MsgEditToken, MsgIssueToken, MsgMintToken, MsgTransferTokenOwner, ROUTE};
pub use token::{
    check_min_unit, check_name, check_symbol, normalize_denom, Token, DO_NOT_MODIFY,
    MAXIMUM_INIT_SUPPLY, MAXIMUM_MAX_SUPPLY, MAXIMUM_SCALE,
};
