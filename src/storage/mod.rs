//! Storage module: key-value store, token entity store and snapshot files

pub mod keys;
pub mod kv;
pub mod persistence;
pub mod token_store;

pub use kv::{CacheStore, ChangeSet, KvStore, MemStore, PrefixIter, StoreError};
pub use persistence::{
    load_from_file, save_to_file, Snapshot, Storage, StorageConfig, StorageError, StorageStats,
};
pub use token_store::TokenStore;
