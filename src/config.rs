use crate::{error::CountdownError, events::DEFAULT_STORAGE_KEY, ticker::TICK_PERIOD};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

const CONFIG_FILENAME: &str = "config.ron";
const STORAGE_DIRNAME: &str = "storage";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// How often the countdowns are recomputed
    pub tick_interval_ms: u64,
    /// Storage slot holding the event list
    pub storage_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_PERIOD.as_millis() as u64,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Config {
    /// Reads the config from `root`, writing the defaults there first if there is none
    pub fn load(root: &Path) -> Result<Self, CountdownError> {
        let config = match Self::try_read(root)? {
            Some(config) => config,
            None => {
                debug!("No configuration found, saving defaults");
                let config = Self::default();
                config.save(root)?;
                config
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CountdownError> {
        if self.tick_interval_ms == 0 {
            Err(CountdownError::InvalidTickInterval)?
        }

        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Directory the event storage lives in
    pub fn storage_dir(root: &Path) -> PathBuf {
        root.join(STORAGE_DIRNAME)
    }
}

impl Saveable for Config {
    fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILENAME)
    }
}

pub trait Saveable: Serialize + DeserializeOwned {
    fn path(root: &Path) -> PathBuf;

    fn save(&self, root: &Path) -> Result<(), CountdownError> {
        let path = Self::path(root);

        fs::write(path, ron::to_string(self)?)?;

        Ok(())
    }

    /// `None` if the file does not exist
    fn try_read(root: &Path) -> Result<Option<Self>, CountdownError> {
        let path = Self::path(root);
        if !path.is_file() {
            return Ok(None);
        }

        let config = fs::read_to_string(path)?;
        let config = ron::from_str(&config)?;

        Ok(Some(config))
    }
}
