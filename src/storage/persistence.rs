//! Wallet persistence layer
//!
//! Provides save/load functionality for the wallet and chain state. Both
//! are written together as one JSON document, so a save either replaces
//! the whole state or leaves the previous one in place.

use crate::chain::Chain;
use crate::multisig::MultiSigWallet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
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
            data_dir: PathBuf::from(".multisig_data"),
            state_file: "state.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

#[derive(Serialize)]
struct StateRef<'a> {
    wallet: &'a MultiSigWallet,
    chain: &'a Chain,
}

#[derive(Deserialize)]
struct StoredState {
    wallet: MultiSigWallet,
    chain: Chain,
}

/// Wallet storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    fn state_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.state_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.state_file, index))
    }

    /// Save wallet and chain in one write
    pub fn save(&self, wallet: &MultiSigWallet, chain: &Chain) -> Result<(), StorageError> {
        let path = self.state_path();

        if self.config.backup_enabled && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.state_file));
        write_pretty(&temp_path, &StateRef { wallet, chain })?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    /// Load wallet and chain from disk
    pub fn load(&self) -> Result<(MultiSigWallet, Chain), StorageError> {
        let path = self.state_path();
        if !path.exists() {
            return Err(StorageError::InvalidData(
                "State file not found".to_string(),
            ));
        }
        read_state(&path)
    }

    /// Check if saved state exists
    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        if self.config.max_backups == 0 {
            return Ok(());
        }

        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Read a backup; 0 is the state before the most recent save
    pub fn restore_backup(
        &self,
        backup_index: usize,
    ) -> Result<(MultiSigWallet, Chain), StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        read_state(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(i).exists())
            .collect()
    }

    /// Get storage statistics
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

/// Write pretty JSON and make sure it reached the disk
fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn verify_wallet(wallet: &MultiSigWallet) -> Result<(), StorageError> {
    if !wallet.verify_address() {
        return Err(StorageError::InvalidData(format!(
            "Wallet address {} does not match its owner set",
            wallet.address()
        )));
    }
    Ok(())
}

fn read_state(path: &Path) -> Result<(MultiSigWallet, Chain), StorageError> {
    let state: StoredState = read_json(path)?;
    verify_wallet(&state.wallet)?;
    Ok((state.wallet, state.chain))
}

/// Save a wallet to a specific file path
pub fn save_to_file(wallet: &MultiSigWallet, path: &Path) -> Result<(), StorageError> {
    write_pretty(path, wallet)
}

/// Load a wallet from a specific file path
pub fn load_from_file(path: &Path) -> Result<MultiSigWallet, StorageError> {
    let wallet: MultiSigWallet = read_json(path)?;
    verify_wallet(&wallet)?;
    Ok(wallet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Address;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    fn create_test_wallet() -> MultiSigWallet {
        let mut wallet = MultiSigWallet::new(vec![addr(1), addr(2), addr(3)], 2).unwrap();
        wallet.on_deposit(&addr(1), 1_000, &[]).unwrap();
        wallet
            .submit(&addr(1), addr(3), 100, b"some data".to_vec())
            .unwrap();
        wallet.approve(&addr(2), 0).unwrap();
        wallet
    }

    fn test_storage(temp_dir: &tempfile::TempDir, max_backups: usize) -> Storage {
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_backups,
            ..Default::default()
        };
        Storage::new(config).unwrap()
    }

    #[test]
    fn test_save_load_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(&temp_dir, 5);
        let wallet = create_test_wallet();
        let mut chain = Chain::new();
        chain.fund(&addr(1), 77, &wallet).unwrap();

        storage.save(&wallet, &chain).unwrap();
        assert!(storage.exists());

        let (loaded, loaded_chain) = storage.load().unwrap();
        assert_eq!(loaded.address(), wallet.address());
        assert_eq!(loaded.balance(), 1_000);
        assert_eq!(loaded.transaction(0).unwrap(), wallet.transaction(0).unwrap());
        assert!(loaded.is_approved(0, &addr(2)));
        assert_eq!(loaded.events(), wallet.events());
        assert_eq!(loaded_chain.balance_of(&addr(1)), 77);
    }

    #[test]
    fn test_load_missing_state() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(&temp_dir, 5);

        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(&temp_dir, 5);
        storage.save(&create_test_wallet(), &Chain::new()).unwrap();

        assert!(!temp_dir.path().join("state.json.tmp").exists());
        assert!(temp_dir.path().join("state.json").exists());
    }

    #[test]
    fn test_tampered_owner_set_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");
        save_to_file(&create_test_wallet(), &path).unwrap();

        // Duplicate an owner
        let data = fs::read_to_string(&path).unwrap();
        let tampered = data.replacen(&addr(3).to_string(), &addr(1).to_string(), 1);
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(StorageError::SerializationError(_))
        ));
    }

    #[test]
    fn test_swapped_owner_set_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");
        save_to_file(&create_test_wallet(), &path).unwrap();

        // A valid but different owner set no longer matches the custody address
        let data = fs::read_to_string(&path).unwrap();
        let tampered = data.replacen(&addr(3).to_string(), &addr(4).to_string(), 1);
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = test_storage(&temp_dir, 3);
        let mut wallet = create_test_wallet();
        let chain = Chain::new();

        // Save multiple times to create backups
        for i in 0..5u128 {
            wallet.on_deposit(&addr(9), i, &[]).unwrap();
            storage.save(&wallet, &chain).unwrap();
        }

        // Should have max 3 backups
        let backups = storage.list_backups();
        assert!(backups.len() <= 3);
        assert_eq!(storage.stats().unwrap().backup_count, backups.len());

        // Most recent backup is the state before the last save
        let (restored, _) = storage.restore_backup(0).unwrap();
        assert_eq!(restored.balance(), wallet.balance() - 4);
        assert!(storage.restore_backup(7).is_err());
    }
}
