//! Store key layout
//!
//! - `token:<symbol>` holds the token record
//! - `minUnit:<min_unit>` resolves a min unit to its symbol
//! - `ownerTokens:<len><owner><symbol>` marks that `owner` owns `symbol`
//! - `params` holds the versioned fee parameters
//!
//! The owner is length-prefixed with one byte, so a scan over one owner's
//! prefix never picks up an owner whose name extends it.

pub const PREFIX_TOKEN: &[u8] = b"token:";
pub const PREFIX_MIN_UNIT: &[u8] = b"minUnit:";
pub const PREFIX_OWNER_TOKENS: &[u8] = b"ownerTokens:";
pub const KEY_PARAMS: &[u8] = b"params";

fn join(prefix: &[u8], rest: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + rest.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(rest);
    key
}

/// Key of the token record for `symbol`
pub fn token_key(symbol: &str) -> Vec<u8> {
    join(PREFIX_TOKEN, symbol.as_bytes())
}

/// Key of the min unit index entry
pub fn min_unit_key(min_unit: &str) -> Vec<u8> {
    join(PREFIX_MIN_UNIT, min_unit.as_bytes())
}

/// Prefix of every owner index entry for `owner`
///
/// Owners longer than 255 bytes are rejected by message validation.
pub fn owner_prefix(owner: &str) -> Vec<u8> {
    let owner = owner.as_bytes();
    let mut key = join(PREFIX_OWNER_TOKENS, &[owner.len().min(u8::MAX as usize) as u8]);
    key.extend_from_slice(owner);
    key
}

/// Key of the owner index entry for (`owner`, `symbol`)
pub fn owner_token_key(owner: &str, symbol: &str) -> Vec<u8> {
    let mut key = owner_prefix(owner);
    key.extend_from_slice(symbol.as_bytes());
    key
}
