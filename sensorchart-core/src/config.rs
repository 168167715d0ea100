use crate::window::{WindowSelector, WindowTable};
use feed::{FeedError, FeedPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "SENSORCHART_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "sensorchart.toml";
pub const DEFAULT_FEED_ROOT: &str = "sensors";
pub const DEFAULT_STORE_FILE: &str = "sensorchart_selection.json";
pub const DEFAULT_REFRESH_SECONDS: u64 = 30;
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid feed root: {0}")]
    FeedRoot(#[from] FeedError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Path listing every sensor; one sensor's readings live at `<root>/<id>`.
    pub root: String,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            root: DEFAULT_FEED_ROOT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    /// Ordinal into the compact table used by the single-sensor chart.
    pub single_default: usize,
    /// Ordinal into the full table used by the overview.
    pub overview_default: usize,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            single_default: 0,
            overview_default: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub feed: FeedSection,
    pub window: WindowSection,
    pub store: StoreSection,
    pub refresh_seconds: u64,
    pub log_level: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            feed: FeedSection::default(),
            window: WindowSection::default(),
            store: StoreSection::default(),
            refresh_seconds: DEFAULT_REFRESH_SECONDS,
            log_level: "info".to_string(),
        }
    }
}

impl ChartConfig {
    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig = toml::from_str(data)?;
        Ok(config.normalized())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data)
    }

    /// Explicit path first, then `SENSORCHART_CONFIG`, then
    /// `./sensorchart.toml`, then built-in defaults. Only the implicit
    /// default file may fail silently (with a warning).
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            match Self::load(default_path) {
                Ok(config) => return Ok(config),
                Err(err) => log::warn!("{err}; using defaults"),
            }
        }
        Ok(Self::default())
    }

    pub fn normalized(mut self) -> Self {
        self.window.single_default = self
            .window
            .single_default
            .min(WindowTable::Compact.len() - 1);
        self.window.overview_default = self
            .window
            .overview_default
            .min(WindowTable::Full.len() - 1);
        self.refresh_seconds = self.refresh_seconds.max(1);
        let level = self.log_level.trim().to_ascii_lowercase();
        self.log_level = if LOG_LEVELS.contains(&level.as_str()) {
            level
        } else {
            log::warn!("unknown log level '{}', using info", self.log_level);
            "info".to_string()
        };
        self
    }

    pub fn feed_root(&self) -> Result<FeedPath, ConfigError> {
        Ok(FeedPath::parse(&self.feed.root)?)
    }

    pub fn refresh_cadence(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds.max(1))
    }

    pub fn single_window(&self) -> WindowSelector {
        WindowSelector::new(WindowTable::Compact, self.window.single_default)
    }

    pub fn overview_window(&self) -> WindowSelector {
        WindowSelector::new(WindowTable::Full, self.window.overview_default)
    }
}
