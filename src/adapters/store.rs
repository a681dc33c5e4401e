//! In-memory key-value store adapter.
//!
//! Implements both [`StoragePort`] and [`ProfileStore`].  Stands in for
//! the browser's local storage: the profile lives as one JSON blob under
//! `safeguard::csg_data`, the same shape the app has always written.
//!
//! - Validation: profiles are range-checked before persistence.
//! - Namespace isolation: keys are stored as `<namespace>::<key>`.
//! - Quota: an optional byte budget makes writes fail with
//!   [`StorageError::Full`], mirroring a full browser store.

use std::collections::HashMap;

use log::{info, warn};

use crate::app::ports::{ProfileStore, StoragePort};
use crate::config::{Profile, validate_profile};
use crate::error::{ProfileError, StorageError};

pub const PROFILE_NAMESPACE: &str = "safeguard";
pub const PROFILE_KEY: &str = "csg_data";

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses writes once `bytes` are in use.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(bytes),
        }
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    fn used_bytes_excluding(&self, composite: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != composite)
            .map(|(_, v)| v.len())
            .sum()
    }

    pub fn exists(&self, namespace: &str, key: &str) -> bool {
        self.entries
            .contains_key(&Self::composite_key(namespace, key))
    }
}

impl StoragePort for MemoryStore {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.entries
            .get(&Self::composite_key(namespace, key))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let composite = Self::composite_key(namespace, key);
        if let Some(quota) = self.quota_bytes {
            if self.used_bytes_excluding(&composite) + data.len() > quota {
                warn!("MemoryStore: quota exceeded writing {}", composite);
                return Err(StorageError::Full);
            }
        }
        self.entries.insert(composite, data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.entries.remove(&Self::composite_key(namespace, key));
        Ok(())
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self) -> Result<Profile, ProfileError> {
        match self.read(PROFILE_NAMESPACE, PROFILE_KEY) {
            Ok(bytes) => {
                let profile: Profile =
                    serde_json::from_slice(&bytes).map_err(|_| ProfileError::Corrupted)?;
                info!("MemoryStore: loaded profile ({} bytes)", bytes.len());
                Ok(profile)
            }
            Err(StorageError::NotFound) => {
                info!("MemoryStore: no stored profile, using defaults");
                Ok(Profile::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, profile: &Profile) -> Result<(), ProfileError> {
        validate_profile(profile)?;
        let bytes = serde_json::to_vec(profile).map_err(|_| ProfileError::Corrupted)?;
        self.write(PROFILE_NAMESPACE, PROFILE_KEY, &bytes)?;
        info!("MemoryStore: profile saved ({} bytes)", bytes.len());
        Ok(())
    }
}
