//! JSON file persistence: three collections, each loaded fully at open and
//! rewritten whole on mutation.
//!
//! Writes go to a temp file in the same directory and are renamed into
//! place, so a crash mid-save never leaves a half-written collection.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use reckon_core::{Category, Transaction};

use crate::cache::MerchantCache;

const CATEGORIES_FILE: &str = "categories.json";
const TRANSACTIONS_FILE: &str = "transactions.json";
const MERCHANT_CACHE_FILE: &str = "merchant_cache.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate transaction id {0}")]
    DuplicateId(String),
    #[error("duplicate category code {0}")]
    DuplicateCategory(String),
}

/// Owns the three persisted collections: categories, transactions, and the
/// merchant cache. Single-writer; concurrent writers are unsupported and
/// last-writer-wins at the file level.
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    cache: MerchantCache,
}

impl JsonStore {
    /// Load all collections from `dir`, treating missing files as empty.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        let categories = load_or_default(&dir.join(CATEGORIES_FILE))?;
        let transactions = load_or_default(&dir.join(TRANSACTIONS_FILE))?;
        let cache = load_or_default(&dir.join(MERCHANT_CACHE_FILE))?;
        Ok(Self {
            dir,
            categories,
            transactions,
            cache,
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn merchant_cache(&self) -> &MerchantCache {
        &self.cache
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Add a category and persist. Duplicate codes are rejected.
    pub fn add_category(&mut self, category: Category) -> Result<(), StoreError> {
        if self.categories.iter().any(|c| c.code == category.code) {
            return Err(StoreError::DuplicateCategory(category.code));
        }
        self.categories.push(category);
        write_atomic(&self.dir.join(CATEGORIES_FILE), &self.categories)
    }

    /// Append newly imported transactions and persist, newest first.
    /// Transaction ids must be unique across the store.
    pub fn append_transactions(&mut self, new: Vec<Transaction>) -> Result<(), StoreError> {
        for t in &new {
            if self.transactions.iter().any(|e| e.id == t.id) {
                return Err(StoreError::DuplicateId(t.id.clone()));
            }
        }
        self.transactions.extend(new);
        self.transactions.sort_by(|a, b| b.date.cmp(&a.date));
        write_atomic(&self.dir.join(TRANSACTIONS_FILE), &self.transactions)
    }

    pub(crate) fn transactions_mut(&mut self) -> &mut [Transaction] {
        &mut self.transactions
    }

    pub(crate) fn cache_mut(&mut self) -> &mut MerchantCache {
        &mut self.cache
    }

    /// Persist transactions and merchant cache as one unit: both payloads are
    /// staged to temp files before either is renamed into place, so a
    /// serialization or write failure leaves both collections untouched.
    pub fn save_transactions_and_cache(&self) -> Result<(), StoreError> {
        let txn_path = self.dir.join(TRANSACTIONS_FILE);
        let cache_path = self.dir.join(MERCHANT_CACHE_FILE);

        let txn_tmp = stage(&txn_path, &self.transactions)?;
        let cache_tmp = match stage(&cache_path, &self.cache) {
            Ok(tmp) => tmp,
            Err(err) => {
                let _ = fs::remove_file(&txn_tmp);
                return Err(err);
            }
        };

        commit(&txn_tmp, &txn_path)?;
        commit(&cache_tmp, &cache_path)?;
        debug!(dir = %self.dir.display(), "persisted transactions and merchant cache");
        Ok(())
    }

    /// Throw away in-memory state and reload everything from disk.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.categories = load_or_default(&self.dir.join(CATEGORIES_FILE))?;
        self.transactions = load_or_default(&self.dir.join(TRANSACTIONS_FILE))?;
        self.cache = load_or_default(&self.dir.join(MERCHANT_CACHE_FILE))?;
        Ok(())
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `value` next to `path` without replacing it yet.
fn stage<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json).map_err(|source| StoreError::Io {
        path: tmp.clone(),
        source,
    })?;
    Ok(tmp)
}

fn commit(tmp: &Path, path: &Path) -> Result<(), StoreError> {
    fs::rename(tmp, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let tmp = stage(path, value)?;
    commit(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
