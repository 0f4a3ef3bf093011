use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use crate::models::errors::StorageError;

/// Flat string keys used by the client. Values are JSON-encoded where
/// structured.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const ROLE: &str = "role";
    pub const PROFILE_COMPLETE: &str = "profile_complete";
    pub const FIREBASE_ID_TOKEN: &str = "firebase_id_token";
    pub const PUSH_TOKEN: &str = "push_token";
    pub const NOTIFIED_RIDE_IDS: &str = "notified_ride_ids";
}

/// Durable key-value storage backed by a single JSON file. One writer per
/// key in practice; every mutation rewrites the file.
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    path: PathBuf,
    entries: HashMap<String, Value>,
}

impl KeyValueStore {
    /// Opens the store at `path`, starting empty when the file does not
    /// exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.entries.get(key).and_then(|v| v.as_str().map(String::from))
    }

    pub fn set_str(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), Value::String(value.to_string()));
        self.persist()
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.persist()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    /// Wipes every key. Used on sign-out.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
