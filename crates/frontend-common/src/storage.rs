//! Persistent key-value storage for session data
//!
//! All reads and writes of durable session data go through [`PersistentStore`].
//! Implementations never fail: when durable storage is unavailable they degrade
//! to no-ops, so callers never guard for it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Flat string key-value store
pub trait PersistentStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store used when no durable storage exists
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl PersistentStore for NullStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store, e.g. to simulate data left by a previous run
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        lock(&self.entries).remove(key);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::{PersistentStore, lock};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tracing::warn;

    /// Store backed by a single JSON object file
    ///
    /// The whole map is rewritten on every mutation through a sibling temp
    /// file and a rename, so a crash never leaves a half-written file behind.
    #[derive(Debug)]
    pub struct FileStore {
        path: PathBuf,
        entries: Mutex<HashMap<String, String>>,
    }

    impl FileStore {
        /// Open the store at `path`; a missing or unreadable file starts empty
        pub fn open(path: impl Into<PathBuf>) -> Self {
            let path = path.into();
            let entries = Self::load(&path);
            Self {
                path,
                entries: Mutex::new(entries),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn load(path: &Path) -> HashMap<String, String> {
            let contents = match std::fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read session store");
                    return HashMap::new();
                }
            };

            serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Discarding corrupt session store");
                HashMap::new()
            })
        }

        fn persist(&self, entries: &HashMap<String, String>) {
            if let Err(e) = self.write_atomically(entries) {
                warn!(path = %self.path.display(), error = %e, "Failed to write session store");
            }
        }

        fn write_atomically(&self, entries: &HashMap<String, String>) -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_vec_pretty(entries)?;
            let tmp = self.path.with_extension("tmp");
            std::fs::write(&tmp, contents)?;
            std::fs::rename(&tmp, &self.path)
        }
    }

    impl PersistentStore for FileStore {
        fn get(&self, key: &str) -> Option<String> {
            lock(&self.entries).get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            let mut entries = lock(&self.entries);
            entries.insert(key.to_string(), value.to_string());
            self.persist(&entries);
        }

        fn remove(&self, key: &str) {
            let mut entries = lock(&self.entries);
            if entries.remove(key).is_some() {
                self.persist(&entries);
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::PersistentStore;
    use tracing::warn;
    use web_sys::Storage;

    /// Browser `localStorage`
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LocalStore;

    /// Get localStorage
    fn get_local_storage() -> Option<Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }

    impl PersistentStore for LocalStore {
        fn get(&self, key: &str) -> Option<String> {
            get_local_storage().and_then(|storage| storage.get_item(key).ok().flatten())
        }

        fn set(&self, key: &str, value: &str) {
            if let Some(storage) = get_local_storage() {
                if let Err(e) = storage.set_item(key, value) {
                    warn!(key, error = ?e, "Failed to write localStorage entry");
                }
            }
        }

        fn remove(&self, key: &str) {
            if let Some(storage) = get_local_storage() {
                if let Err(e) = storage.remove_item(key) {
                    warn!(key, error = ?e, "Failed to remove localStorage entry");
                }
            }
        }
    }
}
