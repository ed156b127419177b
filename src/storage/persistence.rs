//! Registry persistence layer
//!
//! Saves the registry as a snapshot (genesis export plus bank state) and
//! rebuilds the store from it on load.

use crate::config::RegistryConfig;
use crate::core::error::RegistryResult;
use crate::core::params::VersionedParams;
use crate::ledger::Bank;
use crate::registry::{GenesisState, MemRegistry, Registry};
use crate::storage::kv::MemStore;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything needed to rebuild a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    pub params_version: u64,
    pub genesis: GenesisState,
    pub bank: Bank,
}

impl Snapshot {
    pub fn capture(registry: &MemRegistry) -> RegistryResult<Self> {
        Ok(Self {
            saved_at: Utc::now(),
            params_version: registry.versioned_params()?.version,
            genesis: registry.export_genesis()?,
            bank: registry.ledger().clone(),
        })
    }

    /// Rebuild a registry with a fresh store from this snapshot
    pub fn restore(self, config: RegistryConfig) -> RegistryResult<MemRegistry> {
        let mut registry = Registry::new(MemStore::new(), self.bank, config);
        registry.init_genesis(&self.genesis)?;
        registry.restore_params(VersionedParams {
            version: self.params_version,
            params: self.genesis.params,
        })?;
        Ok(registry)
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".registry_data"),
            state_file: "registry.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Snapshot storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    fn state_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.state_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.state_file, index))
    }

    /// Write the snapshot, keeping the previous one as a backup
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let path = self.state_path();

        if self.config.backup_enabled && path.exists() && self.config.max_backups > 0 {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Temp file then rename, so a crash never leaves a torn state file
        let temp_path = self.config.data_dir.join(format!("{}.tmp", self.config.state_file));
        save_to_file(snapshot, &temp_path)?;
        fs::rename(&temp_path, &path)?;

        log::debug!("Saved snapshot to {}", path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Snapshot, StorageError> {
        let path = self.state_path();
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "State file {} not found, run init first",
                path.display()
            )));
        }
        load_from_file(&path)
    }

    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.state_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    pub fn restore_backup(&self, backup_index: usize) -> Result<Snapshot, StorageError> {
        let backup_path = self.backup_path(backup_index);
        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }
        load_from_file(&backup_path)
    }

    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }

    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.state_path();
        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

/// Write any serializable value as pretty JSON
pub fn save_to_file<T: Serialize>(value: &T, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Read a JSON file written by [`save_to_file`]
pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}
