//! Durable key/value store for level session state.
//!
//! Keys are flat strings (`"<levelId>.<field>"`), values are booleans or
//! integers. The file-backed store keeps everything in memory and rewrites
//! the whole JSON file on [`flush`](KeyValueStore::flush), using file
//! locking and an atomic rename so a crash never leaves a torn file.

use crate::{Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A stored scalar
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StoreValue {
    Bool(bool),
    Int(i64),
}

/// Flat preferences-style storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<StoreValue>;
    fn put(&mut self, key: &str, value: StoreValue);
    fn remove(&mut self, key: &str);

    /// Make every prior `put`/`remove` durable before returning
    fn flush(&mut self) -> Result<()>;

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(StoreValue::Bool(b)) => b,
            Some(other) => {
                tracing::warn!("Store key {} holds {:?}, expected a bool", key, other);
                default
            }
            None => default,
        }
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(StoreValue::Int(n)) => n,
            Some(other) => {
                tracing::warn!("Store key {} holds {:?}, expected an integer", key, other);
                default
            }
            None => default,
        }
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.put(key, StoreValue::Bool(value));
    }

    fn put_int(&mut self, key: &str, value: i64) {
        self.put(key, StoreValue::Int(value));
    }
}

/// Volatile store, mostly for tests and dry runs
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, StoreValue>,
    flushes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `flush` has been called
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn entries(&self) -> &BTreeMap<String, StoreValue> {
        &self.entries
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<StoreValue> {
        self.entries.get(key).copied()
    }

    fn put(&mut self, key: &str, value: StoreValue) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// JSON-file backed store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, StoreValue>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupted
    /// file is logged and treated as empty; it is replaced on next flush.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> BTreeMap<String, StoreValue> {
        if !path.exists() {
            tracing::info!("No level store found at {:?}, starting empty", path);
            return BTreeMap::new();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open level store {:?}: {}. Starting empty.", path, e);
                return BTreeMap::new();
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock level store {:?}: {}. Starting empty.", path, e);
            return BTreeMap::new();
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        if let Err(e) = read {
            tracing::warn!("Failed to read level store {:?}: {}. Starting empty.", path, e);
            return BTreeMap::new();
        }

        match serde_json::from_str::<BTreeMap<String, StoreValue>>(&contents) {
            Ok(entries) => {
                tracing::debug!("Loaded {} store entries from {:?}", entries.len(), path);
                entries
            }
            Err(e) => {
                tracing::warn!("Failed to parse level store {:?}: {}. Starting empty.", path, e);
                BTreeMap::new()
            }
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<StoreValue> {
        self.entries.get(key).copied()
    }

    fn put(&mut self, key: &str, value: StoreValue) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Write all entries to a temp file, sync it, and rename it over the
    /// store file.
    fn flush(&mut self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let temp = NamedTempFile::new_in(&parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &self.entries)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Flushed {} store entries to {:?}", self.entries.len(), self.path);
        Ok(())
    }
}
