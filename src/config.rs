use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;
use crate::router::DEFAULT_BODY_LIMIT;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DATA_DIR: &str = "data/sunrise-press";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreBackend {
    /// On-disk sled database under `data_dir`.
    Sled,
    /// Process memory; contents vanish on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sled" => Ok(Self::Sled),
            "memory" => Ok(Self::Memory),
            other => Err(Error::Config(format!("unknown store backend `{other}`"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub addr: SocketAddr,
    pub store: StoreBackend,
    pub data_dir: PathBuf,
    /// Upper bound on any single store operation.
    pub store_timeout: Duration,
    /// Directory of `<name>.hbs` files overriding the embedded templates.
    pub templates_dir: Option<PathBuf>,
    /// Largest request body accepted, in bytes.
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            store: StoreBackend::Sled,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            templates_dir: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    /// Reads `SUNRISE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let addr = lookup("SUNRISE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_owned());
        let addr = addr
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("SUNRISE_ADDR `{addr}`: {e}")))?;

        let store = match lookup("SUNRISE_STORE") {
            Some(s) => s.parse()?,
            None => StoreBackend::Sled,
        };

        let data_dir = lookup("SUNRISE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let timeout_ms = match lookup("SUNRISE_STORE_TIMEOUT_MS") {
            Some(ms) => ms.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("SUNRISE_STORE_TIMEOUT_MS `{ms}`: {e}"))
            })?,
            None => DEFAULT_STORE_TIMEOUT_MS,
        };

        let templates_dir = lookup("SUNRISE_TEMPLATES_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let body_limit = match lookup("SUNRISE_BODY_LIMIT_BYTES") {
            Some(bytes) => bytes.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("SUNRISE_BODY_LIMIT_BYTES `{bytes}`: {e}"))
            })?,
            None => DEFAULT_BODY_LIMIT,
        };

        let settings = Self {
            addr,
            store,
            data_dir,
            store_timeout: Duration::from_millis(timeout_ms),
            templates_dir,
            body_limit,
        };

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.store_timeout.is_zero() {
            return Err(Error::Config("store timeout must be greater than 0".into()));
        }
        if self.body_limit == 0 {
            return Err(Error::Config("body limit must be greater than 0".into()));
        }
        if self.store == StoreBackend::Sled && self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("data directory cannot be empty".into()));
        }
        if let Some(dir) = &self.templates_dir {
            if !dir.is_dir() {
                return Err(Error::Config(format!(
                    "templates directory `{}` does not exist",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
