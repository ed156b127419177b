//! Registry operations
//!
//! Each message carries everything one state transition needs and checks its
//! own shape in `validate_basic` before the registry looks at stored state.

use crate::config::MODULE_NAME;
use crate::core::error::{RegistryError, RegistryResult};
use crate::token::token::{
    check_address, check_symbol, normalize_denom, Token, DO_NOT_MODIFY, MAXIMUM_MAX_SUPPLY,
    MAXIMUM_NAME_LEN,
};
use serde::{Deserialize, Serialize};

/// Route shared by all token messages
pub const ROUTE: &str = MODULE_NAME;

pub const TYPE_MSG_ISSUE_TOKEN: &str = "issue_token";
pub const TYPE_MSG_EDIT_TOKEN: &str = "edit_token";
pub const TYPE_MSG_MINT_TOKEN: &str = "mint_token";
pub const TYPE_MSG_TRANSFER_TOKEN_OWNER: &str = "transfer_token_owner";

// =============================================================================
// Issue
// =============================================================================

/// Issue a new token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgIssueToken {
    pub symbol: String,
    pub name: String,
    pub scale: u8,
    pub min_unit: String,
    pub initial_supply: u64,
    /// Zero lets the registry derive the ceiling from `mintable`
    pub max_supply: u64,
    pub mintable: bool,
    pub owner: String,
}

impl MsgIssueToken {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: &str,
        min_unit: &str,
        name: &str,
        scale: u8,
        initial_supply: u64,
        max_supply: u64,
        mintable: bool,
        owner: &str,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            scale,
            min_unit: min_unit.to_string(),
            initial_supply,
            max_supply,
            mintable,
            owner: owner.to_string(),
        }
    }

    /// The normalized record this message would create
    pub fn to_token(&self) -> Token {
        Token::new(
            &self.symbol,
            &self.name,
            &self.min_unit,
            self.scale,
            self.initial_supply,
            self.max_supply,
            self.mintable,
            self.owner.clone(),
        )
    }

    pub fn validate_basic(&self) -> RegistryResult<()> {
        self.to_token().validate()
    }
}

// =============================================================================
// Edit
// =============================================================================

/// Edit the mutable fields of a token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEditToken {
    pub symbol: String,
    pub owner: String,
    /// Zero leaves the ceiling unchanged
    pub max_supply: u64,
    /// `None` leaves the flag unchanged
    pub mintable: Option<bool>,
    /// `None` leaves the name unchanged
    pub name: Option<String>,
}

impl MsgEditToken {
    /// An empty name or [`DO_NOT_MODIFY`] keeps the current name
    pub fn new(
        name: &str,
        symbol: &str,
        max_supply: u64,
        mintable: Option<bool>,
        owner: &str,
    ) -> Self {
        let name = name.trim();
        let name = if name.is_empty() || name == DO_NOT_MODIFY {
            None
        } else {
            Some(name.to_string())
        };

        Self {
            symbol: normalize_denom(symbol),
            owner: owner.to_string(),
            max_supply,
            mintable,
            name,
        }
    }

    /// The new name, if this edit changes it
    pub fn new_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty() && *n != DO_NOT_MODIFY)
    }

    pub fn validate_basic(&self) -> RegistryResult<()> {
        check_address(&self.owner, "owner of the token")?;

        if let Some(name) = self.new_name() {
            if name.chars().count() > MAXIMUM_NAME_LEN {
                return Err(RegistryError::InvalidArgument(format!(
                    "invalid token name {}, only accepts length (0, {}]",
                    name, MAXIMUM_NAME_LEN
                )));
            }
        }

        if self.max_supply > MAXIMUM_MAX_SUPPLY {
            return Err(RegistryError::InvalidMaxSupply(format!(
                "max supply {} exceeds the limit {}",
                self.max_supply, MAXIMUM_MAX_SUPPLY
            )));
        }

        check_symbol(&self.symbol)
    }
}

// =============================================================================
// Mint
// =============================================================================

/// Mint more of a mintable token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgMintToken {
    pub symbol: String,
    pub owner: String,
    /// Recipient; the owner when unset or empty
    pub to: Option<String>,
    /// Main units to mint
    pub amount: u64,
}

impl MsgMintToken {
    pub fn new(symbol: &str, owner: &str, to: Option<&str>, amount: u64) -> Self {
        Self {
            symbol: normalize_denom(symbol),
            owner: owner.to_string(),
            to: to.map(str::to_string),
            amount,
        }
    }

    /// Account credited by the mint
    pub fn recipient(&self) -> &str {
        match self.to.as_deref().map(str::trim) {
            Some(to) if !to.is_empty() => to,
            _ => &self.owner,
        }
    }

    pub fn validate_basic(&self) -> RegistryResult<()> {
        check_address(&self.owner, "owner of the token")?;
        check_address(self.recipient(), "mint recipient")?;

        if self.amount == 0 || self.amount > MAXIMUM_MAX_SUPPLY {
            return Err(RegistryError::InvalidArgument(format!(
                "invalid mint amount {}, only accepts value (0, {}]",
                self.amount, MAXIMUM_MAX_SUPPLY
            )));
        }

        check_symbol(&self.symbol)
    }
}

// =============================================================================
// Transfer Ownership
// =============================================================================

/// Hand a token over to a new owner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgTransferTokenOwner {
    pub src_owner: String,
    pub dst_owner: String,
    pub symbol: String,
}

impl MsgTransferTokenOwner {
    pub fn new(src_owner: &str, dst_owner: &str, symbol: &str) -> Self {
        Self {
            src_owner: src_owner.to_string(),
            dst_owner: dst_owner.to_string(),
            symbol: normalize_denom(symbol),
        }
    }

    pub fn validate_basic(&self) -> RegistryResult<()> {
        check_address(&self.src_owner, "current owner of the token")?;

        if self.dst_owner.trim().is_empty() {
            return Err(RegistryError::InvalidDestination(
                "the new owner must be specified".to_string(),
            ));
        }
        check_address(&self.dst_owner, "new owner of the token")?;

        if self.src_owner == self.dst_owner {
            return Err(RegistryError::InvalidDestination(
                "the new owner must not be same as the original owner".to_string(),
            ));
        }

        check_symbol(&self.symbol)
    }
}

// =============================================================================
// Message Envelope
// =============================================================================

/// One operation of a batch
///
/// `Foreign` stands for an operation routed to another module; the registry
/// never executes it but it ends the fee guard's scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    IssueToken(MsgIssueToken),
    EditToken(MsgEditToken),
    MintToken(MsgMintToken),
    TransferTokenOwner(MsgTransferTokenOwner),
    Foreign { route: String, signer: String },
}

impl Msg {
    pub fn route(&self) -> &str {
        match self {
            Msg::Foreign { route, .. } => route,
            _ => ROUTE,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Msg::IssueToken(_) => TYPE_MSG_ISSUE_TOKEN,
            Msg::EditToken(_) => TYPE_MSG_EDIT_TOKEN,
            Msg::MintToken(_) => TYPE_MSG_MINT_TOKEN,
            Msg::TransferTokenOwner(_) => TYPE_MSG_TRANSFER_TOKEN_OWNER,
            Msg::Foreign { .. } => "foreign",
        }
    }

    /// Account that authorizes and pays for the message
    pub fn signer(&self) -> &str {
        match self {
            Msg::IssueToken(m) => &m.owner,
            Msg::EditToken(m) => &m.owner,
            Msg::MintToken(m) => &m.owner,
            Msg::TransferTokenOwner(m) => &m.src_owner,
            Msg::Foreign { signer, .. } => signer,
        }
    }

    pub fn validate_basic(&self) -> RegistryResult<()> {
        match self {
            Msg::IssueToken(m) => m.validate_basic(),
            Msg::EditToken(m) => m.validate_basic(),
            Msg::MintToken(m) => m.validate_basic(),
            Msg::TransferTokenOwner(m) => m.validate_basic(),
            Msg::Foreign { .. } => Ok(()),
        }
    }
}
