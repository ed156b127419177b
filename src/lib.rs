//! Token Registry: fungible token issuance and management in Rust
//!
//! This crate provides a registry of user-issued tokens featuring:
//! - Unique symbols and min units across a shared namespace
//! - Issuance, editing, minting and ownership transfer by the token owner
//! - Symbol-length fee pricing with a community tax and a burned remainder
//! - A batch fee guard that rejects unaffordable batches up front
//! - Genesis import/export and JSON snapshots
//! - A read-only REST API and a CLI
//!
//! # Example
//!
//! ```rust
//! use token_registry::config::RegistryConfig;
//! use token_registry::core::Coin;
//! use token_registry::ledger::{Bank, Permission};
//! use token_registry::registry::{default_genesis, Registry};
//! use token_registry::storage::MemStore;
//! use token_registry::token::MsgIssueToken;
//!
//! let config = RegistryConfig::default();
//! let mut bank = Bank::new()
//!     .with_pool(&config.module_name, &[Permission::Minter, Permission::Burner])
//!     .with_pool(&config.fee_collector_name, &[]);
//! bank.fund("alice", &Coin::new("ustake", 100_000_000_000)).unwrap();
//!
//! let genesis = default_genesis(&config);
//! let mut registry = Registry::new(MemStore::new(), bank, config);
//! registry.init_genesis(&genesis).unwrap();
//!
//! let msg = MsgIssueToken::new("btc", "satoshi", "Bitcoin", 8, 21_000_000, 0, false, "alice");
//! let token = registry.issue_token(&msg).unwrap();
//! assert_eq!(token.max_supply, 21_000_000);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod ledger;
pub mod registry;
pub mod storage;
pub mod token;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use config::RegistryConfig;
pub use core::{Coin, DecCoin, Params, RegistryError, RegistryResult};
pub use ledger::{Bank, BalanceLedger};
pub use registry::{MemRegistry, Registry};
pub use storage::{MemStore, Storage};
pub use token::{Msg, Token};
