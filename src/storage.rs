use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tokio::fs;
use tracing::{debug, instrument};

/// A string key-value store, the only persistence primitive events depend on
#[allow(async_fn_in_trait)]
pub trait KeyValueStorage {
    /// Returns `None` if nothing was ever stored under `key`
    async fn get_item(&self, key: &str) -> io::Result<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key in its own file below `root`
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        self.root.join(format!("{file_name}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    #[instrument(level = "trace", skip(self))]
    async fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("Nothing stored under {key} yet");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    #[instrument(level = "trace", skip(self, value))]
    async fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root).await?;

        // Replace the file in one step so a failed write never truncates the old value
        let path = self.path(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).await?;
        fs::rename(&staging, &path).await?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// Keeps everything in memory, nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| io::Error::other("memory storage lock poisoned"))
    }
}

impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        self.items()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

impl<T: KeyValueStorage> KeyValueStorage for &T {
    async fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        (**self).set_item(key, value).await
    }
}
