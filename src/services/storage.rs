//! Local key-value storage and the entry collection kept in it
//!
//! The whole reading log lives under a single key, mirroring how browser
//! extension storage holds it. Writes replace the full collection; there is
//! no versioning, so two interleaved load → modify → save sequences can lose
//! one of the updates.

use crate::types::{Entry, ReadlogError, Result};
use async_trait::async_trait;
use directories::BaseDirs;
use fs2::FileExt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Storage key holding the entry collection
pub const ENTRIES_KEY: &str = "blogEntries";

/// File name of the on-disk store inside the data directory
pub const STORE_FILE_NAME: &str = "storage.json";

/// Asynchronous get/set of named JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Key-value store persisted as one JSON object on disk.
pub struct FileKeyValueStore {
    data_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Store under `~/.readlog`
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| ReadlogError::Storage("Cannot determine home directory".into()))?;
        Ok(Self::with_data_dir(base_dirs.home_dir().join(".readlog")))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.store_path();
        let mut object = run_blocking(move || read_store(&path)).await?;
        Ok(object.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let data_dir = self.data_dir.clone();
        let path = self.store_path();
        let key = key.to_string();
        run_blocking(move || {
            let mut object = read_store(&path)?;
            object.insert(key, value);
            write_store(&data_dir, &path, &object)
        })
        .await
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ReadlogError::Storage(format!("Storage task failed: {}", e)))?
}

/// Read the whole store under a shared lock. A missing or empty file is an
/// empty store; anything that is not a JSON object is an error so the file
/// is never overwritten with less than it held.
fn read_store(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        debug!(path = %path.display(), "store file absent");
        return Ok(Map::new());
    }

    let file = File::open(path)
        .map_err(|e| ReadlogError::Storage(format!("Failed to open store: {}", e)))?;
    file.lock_shared()
        .map_err(|e| ReadlogError::Storage(format!("Failed to acquire read lock: {}", e)))?;

    let mut content = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut content);
    let _ = file.unlock();
    read.map_err(|e| ReadlogError::Storage(format!("Failed to read store: {}", e)))?;

    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ReadlogError::Storage(format!(
            "Store file {} does not hold a JSON object",
            path.display()
        ))),
        Err(e) => Err(ReadlogError::Storage(format!(
            "Corrupted store file {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Save using atomic write (temp file + rename) with exclusive lock.
fn write_store(data_dir: &Path, path: &Path, object: &Map<String, Value>) -> Result<()> {
    fs::create_dir_all(data_dir)?;

    let content = serde_json::to_string_pretty(object)?;
    let temp_path = path.with_extension("json.tmp");

    {
        let mut file = File::create(&temp_path)
            .map_err(|e| ReadlogError::Storage(format!("Failed to create temp file: {}", e)))?;
        file.write_all(content.as_bytes())
            .map_err(|e| ReadlogError::Storage(format!("Failed to write temp file: {}", e)))?;
        file.sync_all()
            .map_err(|e| ReadlogError::Storage(format!("Failed to sync temp file: {}", e)))?;
    }

    let target = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    target
        .lock_exclusive()
        .map_err(|e| ReadlogError::Storage(format!("Failed to acquire write lock: {}", e)))?;

    fs::rename(&temp_path, path)
        .map_err(|e| ReadlogError::Storage(format!("Failed to rename temp file: {}", e)))?;

    let _ = target.unlock();
    debug!(path = %path.display(), bytes = content.len(), "store written");
    Ok(())
}

/// In-process key-value store
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// The entry collection, stored as one array under [`ENTRIES_KEY`].
pub struct EntryStore<K> {
    backend: K,
}

impl<K: KeyValueStore> EntryStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    /// Load every entry in stored order. An absent key is an empty log.
    pub async fn load(&self) -> Result<Vec<Entry>> {
        match self.backend.get(ENTRIES_KEY).await? {
            None | Some(Value::Null) => {
                debug!("no stored entries, starting empty");
                Ok(Vec::new())
            }
            Some(Value::Array(items)) => {
                let entries = decode_entries(items);
                debug!(count = entries.len(), "entries loaded");
                Ok(entries)
            }
            Some(other) => Err(ReadlogError::Storage(format!(
                "'{}' holds {} instead of an array",
                ENTRIES_KEY,
                json_kind(&other)
            ))),
        }
    }

    /// Replace the stored collection.
    pub async fn save(&self, entries: &[Entry]) -> Result<()> {
        let value = serde_json::to_value(entries)?;
        self.backend.set(ENTRIES_KEY, value).await?;
        debug!(count = entries.len(), "entries saved");
        Ok(())
    }

    /// Seed an empty collection when nothing is stored yet.
    /// Returns whether the key was created.
    pub async fn initialize(&self) -> Result<bool> {
        if self.backend.get(ENTRIES_KEY).await?.is_some() {
            return Ok(false);
        }
        self.backend.set(ENTRIES_KEY, Value::Array(Vec::new())).await?;
        debug!("initialized empty entry collection");
        Ok(true)
    }
}

/// Decode stored records, skipping elements that are not records at all.
fn decode_entries(items: Vec<Value>) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            warn!(index, kind = json_kind(&item), "skipping stored entry that is not an object");
            continue;
        }
        match serde_json::from_value::<Entry>(item) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(index, error = %e, "skipping undecodable stored entry"),
        }
    }
    entries
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
