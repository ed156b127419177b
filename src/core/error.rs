//! Registry error taxonomy
//!
//! Every failure a registry operation can report. Validation failures are
//! raised before anything is written; ledger and store failures are wrapped
//! unchanged.

use crate::ledger::LedgerError;
use crate::storage::StoreError;
use thiserror::Error;

/// Errors returned by registry operations and queries
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {caller} is not the owner of token {symbol}")]
    Unauthorized { caller: String, symbol: String },
    #[error("Token {0} is set to be non-mintable")]
    NotMintable(String),
    #[error("Invalid max supply: {0}")]
    InvalidMaxSupply(String),
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
    #[error("Insufficient funds for token fee: {payer} has {have}{denom}, needs {need}{denom}")]
    InsufficientFunds {
        payer: String,
        denom: String,
        have: u128,
        need: u128,
    },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias used across the registry
pub type RegistryResult<T> = Result<T, RegistryError>;
