use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default data root, relative to the working directory.
const DEFAULT_DATA_ROOT: &str = "data";

/// Environment override for the data root.
const DATA_ROOT_ENV: &str = "SITEDB_DATA_ROOT";

/// Configuration for a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory every collection file and blob lives under. Absolute or
    /// relative to the working directory.
    pub data_root: PathBuf,

    /// Upper bound on how long a caller waits to enter a collection's
    /// critical section. `None` waits forever.
    pub lock_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            lock_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl StoreConfig {
    /// Build a config with an explicit data root.
    pub fn with_data_root<P: Into<PathBuf>>(data_root: P) -> Self {
        Self {
            data_root: data_root.into(),
            ..Self::default()
        }
    }

    /// Build a config from the environment, honoring `SITEDB_DATA_ROOT`.
    pub fn from_env() -> Self {
        match env::var_os(DATA_ROOT_ENV) {
            Some(root) if !root.is_empty() => Self::with_data_root(PathBuf::from(root)),
            _ => Self::default(),
        }
    }
}
