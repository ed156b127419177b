//! Token entity store
//!
//! One JSON record per token under its symbol, plus two secondary indices:
//! min unit to symbol, and (owner, symbol) pairs. The symbol record is the
//! authoritative copy; indices only ever hold symbols.

use crate::core::error::{RegistryError, RegistryResult};
use crate::core::params::VersionedParams;
use crate::storage::keys::{
    min_unit_key, owner_prefix, owner_token_key, token_key, KEY_PARAMS, PREFIX_TOKEN,
};
use crate::storage::kv::{CacheStore, ChangeSet, KvStore, PrefixIter, StoreError};
use crate::token::Token;

fn corrupt(key: &[u8], reason: impl Into<String>) -> RegistryError {
    RegistryError::Store(StoreError::Corrupt {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: reason.into(),
    })
}

fn decode_token(key: &[u8], value: &[u8]) -> RegistryResult<Token> {
    serde_json::from_slice(value).map_err(|e| corrupt(key, e.to_string()))
}

fn decode_symbol(key: &[u8], value: Vec<u8>) -> RegistryResult<String> {
    String::from_utf8(value).map_err(|_| corrupt(key, "index entry is not utf-8"))
}

/// Typed access to tokens and params over a [`KvStore`]
#[derive(Debug, Clone, Default)]
pub struct TokenStore<S> {
    kv: S,
}

impl<S: KvStore> TokenStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn into_inner(self) -> S {
        self.kv
    }

    /// Start a unit of work whose writes stay pending until committed
    pub fn begin(&self) -> TokenStore<CacheStore<'_, S>> {
        TokenStore::new(CacheStore::new(&self.kv))
    }

    /// Apply the writes of a finished unit of work
    pub fn commit(&mut self, changes: ChangeSet) {
        changes.apply(&mut self.kv);
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.kv.has(&token_key(symbol))
    }

    pub fn has_min_unit(&self, min_unit: &str) -> bool {
        self.kv.has(&min_unit_key(min_unit))
    }

    /// Whether `denom` is taken as a symbol or as a min unit
    pub fn has(&self, denom: &str) -> bool {
        self.has_symbol(denom) || self.has_min_unit(denom)
    }

    /// Token whose symbol is exactly `symbol`
    pub fn get_by_symbol(&self, symbol: &str) -> RegistryResult<Token> {
        let key = token_key(symbol);
        match self.kv.get(&key) {
            Some(value) => decode_token(&key, &value),
            None => Err(RegistryError::NotFound(format!(
                "token {} does not exist",
                symbol
            ))),
        }
    }

    /// Token addressed by symbol, falling back to its min unit
    pub fn get(&self, denom: &str) -> RegistryResult<Token> {
        if self.has_symbol(denom) {
            return self.get_by_symbol(denom);
        }
        match self.symbol_by_min_unit(denom)? {
            Some(symbol) => self.get_by_symbol(&symbol).inspect_err(|_| {
                log::warn!("Min unit {} indexes missing token {}", denom, symbol);
            }),
            None => Err(RegistryError::NotFound(format!(
                "token {} does not exist",
                denom
            ))),
        }
    }

    /// Symbol registered for `min_unit`
    pub fn symbol_by_min_unit(&self, min_unit: &str) -> RegistryResult<Option<String>> {
        let key = min_unit_key(min_unit);
        self.kv
            .get(&key)
            .map(|value| decode_symbol(&key, value))
            .transpose()
    }

    /// Symbols owned by `owner`, in symbol order
    pub fn symbols_by_owner(&self, owner: &str) -> RegistryResult<Vec<String>> {
        self.kv
            .prefix_iter(&owner_prefix(owner))
            .map(|(key, value)| decode_symbol(&key, value))
            .collect()
    }

    /// Snapshot iteration over raw entries under `prefix`
    pub fn iterate(&self, prefix: &[u8]) -> PrefixIter {
        self.kv.prefix_iter(prefix)
    }

    /// Every token, in symbol order
    pub fn tokens(&self) -> impl Iterator<Item = RegistryResult<Token>> {
        self.iterate(PREFIX_TOKEN)
            .map(|(key, value)| decode_token(&key, &value))
    }

    /// Tokens owned by `owner`, in symbol order
    pub fn tokens_by_owner(&self, owner: &str) -> RegistryResult<Vec<Token>> {
        self.symbols_by_owner(owner)?
            .iter()
            .map(|symbol| self.get_by_symbol(symbol))
            .collect()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Overwrite the primary record; no invariant checks
    pub fn put(&mut self, token: &Token) -> RegistryResult<()> {
        let value = serde_json::to_vec(token).map_err(StoreError::from)?;
        self.kv.set(token_key(&token.symbol), value);
        Ok(())
    }

    pub fn set_min_unit_index(&mut self, min_unit: &str, symbol: &str) {
        self.kv
            .set(min_unit_key(min_unit), symbol.as_bytes().to_vec());
    }

    pub fn set_owner_index(&mut self, owner: &str, symbol: &str) {
        self.kv
            .set(owner_token_key(owner, symbol), symbol.as_bytes().to_vec());
    }

    pub fn delete_owner_index(&mut self, owner: &str, symbol: &str) {
        self.kv.delete(&owner_token_key(owner, symbol));
    }

    /// Move the owner index entry of `symbol` from `from` to `to`
    ///
    /// The new entry is written before the old one is removed.
    pub fn move_owner_index(&mut self, symbol: &str, from: &str, to: &str) {
        self.set_owner_index(to, symbol);
        self.delete_owner_index(from, symbol);
    }

    /// Ensure neither denom of `token` is taken by another token
    ///
    /// Symbols and min units share one namespace: a symbol may not equal any
    /// stored min unit and a min unit may not equal any stored symbol. A token
    /// may still use its own symbol as its min unit.
    pub fn check_unique(&self, token: &Token) -> RegistryResult<()> {
        if self.has(&token.symbol) {
            return Err(RegistryError::AlreadyExists(format!(
                "symbol {} already exists",
                token.symbol
            )));
        }
        if self.has(&token.min_unit) {
            return Err(RegistryError::AlreadyExists(format!(
                "min unit {} already exists",
                token.min_unit
            )));
        }
        Ok(())
    }

    /// Store a new token with both indices, rejecting denom collisions
    pub fn add_token(&mut self, token: &Token) -> RegistryResult<()> {
        self.check_unique(token)?;

        self.put(token)?;
        self.set_min_unit_index(&token.min_unit, &token.symbol);
        self.set_owner_index(&token.owner, &token.symbol);
        Ok(())
    }

    // =========================================================================
    // Params
    // =========================================================================

    pub fn params(&self) -> RegistryResult<Option<VersionedParams>> {
        self.kv
            .get(KEY_PARAMS)
            .map(|value| {
                serde_json::from_slice(&value).map_err(|e| corrupt(KEY_PARAMS, e.to_string()))
            })
            .transpose()
    }

    pub fn set_params(&mut self, params: &VersionedParams) -> RegistryResult<()> {
        let value = serde_json::to_vec(params).map_err(StoreError::from)?;
        self.kv.set(KEY_PARAMS.to_vec(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys::{PREFIX_MIN_UNIT, PREFIX_OWNER_TOKENS};
    use crate::storage::kv::MemStore;

    fn token(symbol: &str, min_unit: &str, owner: &str) -> Token {
        Token::new(symbol, "Test Token", min_unit, 6, 1_000, 0, true, owner)
    }

    fn store_with(tokens: &[Token]) -> TokenStore<MemStore> {
        let mut store = TokenStore::new(MemStore::new());
        for t in tokens {
            store.add_token(t).unwrap();
        }
        store
    }

    #[test]
    fn test_add_and_get() {
        let btc = token("btc", "satoshi", "alice");
        let store = store_with(&[btc.clone()]);

        assert!(store.has("btc"));
        assert!(store.has("satoshi"));
        assert_eq!(store.get("btc").unwrap(), btc);
        assert_eq!(store.get("satoshi").unwrap(), btc);
        assert_eq!(store.symbol_by_min_unit("satoshi").unwrap().as_deref(), Some("btc"));
        assert!(matches!(store.get("eth"), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn test_duplicate_min_unit() {
        let mut store = store_with(&[token("btc", "sat", "alice")]);

        let result = store.add_token(&token("bch", "sat", "bob"));
        assert!(matches!(result, Err(RegistryError::AlreadyExists(_))));
        assert!(!store.has_symbol("bch"));
    }

    #[test]
    fn test_cross_namespace_collision() {
        let mut store = store_with(&[token("btc", "satoshi", "alice")]);

        // Symbol equal to an existing min unit
        assert!(store.add_token(&token("satoshi", "usat", "bob")).is_err());
        // Min unit equal to an existing symbol
        assert!(store.add_token(&token("eth", "btc", "bob")).is_err());
        // Own symbol as min unit is fine
        assert!(store.add_token(&token("atom", "atom", "bob")).is_ok());
    }

    #[test]
    fn test_owner_index() {
        let store = store_with(&[
            token("eth", "wei", "alice"),
            token("btc", "satoshi", "alice"),
            token("atom", "uatom", "alicebob"),
        ]);

        assert_eq!(store.symbols_by_owner("alice").unwrap(), vec!["btc", "eth"]);
        assert_eq!(store.symbols_by_owner("alicebob").unwrap(), vec!["atom"]);
        assert!(store.symbols_by_owner("carol").unwrap().is_empty());
    }

    #[test]
    fn test_move_owner_index() {
        let mut store = store_with(&[token("btc", "satoshi", "alice")]);

        store.move_owner_index("btc", "alice", "bob");
        assert!(store.symbols_by_owner("alice").unwrap().is_empty());
        assert_eq!(store.symbols_by_owner("bob").unwrap(), vec!["btc"]);
    }

    #[test]
    fn test_tokens_iteration() {
        let store = store_with(&[token("eth", "wei", "alice"), token("btc", "satoshi", "bob")]);

        let symbols: Vec<String> = store.tokens().map(|t| t.unwrap().symbol).collect();
        assert_eq!(symbols, vec!["btc", "eth"]);
        assert_eq!(store.iterate(PREFIX_MIN_UNIT).count(), 2);
        assert_eq!(store.iterate(PREFIX_OWNER_TOKENS).count(), 2);
    }

    #[test]
    fn test_unit_of_work() {
        let mut store = store_with(&[]);

        let changes = {
            let mut batch = store.begin();
            batch.add_token(&token("btc", "satoshi", "alice")).unwrap();
            assert!(batch.has("satoshi"));
            batch.into_inner().into_changes()
        };
        assert!(!store.has("btc"));

        // Primary record goes first
        assert_eq!(changes.keys().next(), Some(&b"token:btc"[..]));

        store.commit(changes);
        assert!(store.has("btc"));
        assert!(store.has("satoshi"));
    }

    #[test]
    fn test_corrupt_record() {
        let mut kv = MemStore::new();
        kv.set(token_key("btc"), b"not json".to_vec());
        let store = TokenStore::new(kv);

        assert!(matches!(
            store.get("btc"),
            Err(RegistryError::Store(StoreError::Corrupt { .. }))
        ));
    }

    #[test]
    fn test_params_roundtrip() {
        let mut store = store_with(&[]);
        assert!(store.params().unwrap().is_none());

        let params = VersionedParams::default();
        store.set_params(&params).unwrap();
        assert_eq!(store.params().unwrap(), Some(params));
    }
}
