//! Preference store trait and implementations

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::StoreConfig;
use crate::error::{PreferenceError, Result};

/// Abstract trait for preference backends
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a value, `None` when the key has never been set
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool>;

    /// All stored entries, sorted by key
    async fn entries(&self) -> Result<Vec<(String, String)>>;
}

/// In-memory preference store (for testing)
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.values.lock().await.remove(key).is_some())
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        let values = self.values.lock().await;
        Ok(values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

/// JSON file-backed preference store
///
/// The whole map is cached in memory and written back on every change. Writes go to a
/// sibling temp file first and are renamed into place.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePreferenceStore {
    /// Open the store at `path`; a missing file is an empty store
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => parse_entries(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No preferences at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Err(e) => return Err(PreferenceError::Io(e)),
        };

        tracing::info!("Preference store opened at {:?} with {} keys", path, values.len());
        Ok(Self { path, values: Mutex::new(values) })
    }

    /// Open the store described by a configuration
    pub async fn with_config(config: &StoreConfig) -> Result<Self> {
        Self::open(config.path()).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let contents = serde_json::to_string_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Parse the on-disk map, rejecting valid JSON that is not an object of strings
fn parse_entries(contents: &str) -> Result<BTreeMap<String, String>> {
    let value: serde_json::Value = serde_json::from_str(contents)?;
    let serde_json::Value::Object(object) = value else {
        return Err(PreferenceError::corruption("preferences file is not a JSON object"));
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(value) => Ok((key, value)),
            other => Err(PreferenceError::corruption(format!(
                "preference {} holds {} instead of a string",
                key, other
            ))),
        })
        .collect()
}

#[async_trait::async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next).await?;
        *values = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut values = self.values.lock().await;
        if !values.contains_key(key) {
            return Ok(false);
        }
        let mut next = values.clone();
        next.remove(key);
        self.persist(&next).await?;
        *values = next;
        Ok(true)
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        let values = self.values.lock().await;
        Ok(values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
