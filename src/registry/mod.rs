//! Token registry
//!
//! The registry owns the token entity store and drives the balance ledger:
//! - `keeper`: params, lookups and the four state transitions
//! - `fees`: fee pricing and collection
//! - `ante`: the per-batch fee admission check
//! - `handler`: message dispatch, batch delivery and events
//! - `genesis`: bulk import and export
//! - `querier`: normalized read-only queries

pub mod ante;
pub mod fees;
pub mod genesis;
pub mod handler;
pub mod keeper;
pub mod querier;

pub use genesis::{default_genesis, validate_genesis, GenesisState};
pub use handler::{Event, MsgOutcome};
pub use keeper::{MemRegistry, Registry};
