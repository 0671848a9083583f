//! Application configuration: server settings plus endpoints, headers, and
//! timeouts for both market sources.
//!
//! Every field has a default, so an empty file (or none at all) yields a
//! working configuration. Loading order: TOML file, then environment
//! overrides (`MARKETDESK_BIND_ADDR`, `MARKETDESK_DATA_DIR`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file when no path is given.
pub const CONFIG_ENV: &str = "MARKETDESK_CONFIG";

const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub market: MarketConfig,
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path`, else from `$MARKETDESK_CONFIG`, else defaults; then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `MARKETDESK_*` overrides from a lookup function.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("MARKETDESK_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(dir) = lookup("MARKETDESK_DATA_DIR") {
            self.server.data_dir = PathBuf::from(dir);
        }
    }
}

/// HTTP server and persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory holding `users.jsonl` and `leads.jsonl`.
    pub data_dir: PathBuf,
    /// bcrypt work factor (4..=31).
    pub bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
            data_dir: PathBuf::from("data"),
            bcrypt_cost: 12,
        }
    }
}

/// Configuration for both market sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    pub nse: NseConfig,
    pub bse: BseConfig,
}

/// NSE index quotes: landing page for cookies, then the JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NseConfig {
    pub home_url: String,
    pub api_url: String,
    pub user_agent: String,
    pub accept: String,
    pub timeout_secs: u64,
}

impl Default for NseConfig {
    fn default() -> Self {
        Self {
            home_url: "https://www.nseindia.com/".into(),
            api_url: "https://www.nseindia.com/api/equity-stockIndices?index=NIFTY%2050".into(),
            user_agent: CHROME_USER_AGENT.into(),
            accept: "application/json, text/javascript, */*; q=0.01".into(),
            timeout_secs: 5,
        }
    }
}

impl NseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// BSE movers client with its scrip code table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BseConfig {
    /// Gainer/loser endpoint; `GLtype=gainer|loser` is appended.
    pub movers_url: String,
    /// Active equity scrip list used to build the code table.
    pub scrip_codes_url: String,
    pub referer: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Download the scrip code table on first use and keep it fresh.
    pub update_codes: bool,
    /// Maximum age of the scrip code table before it is downloaded again.
    pub code_refresh_secs: u64,
}

impl Default for BseConfig {
    fn default() -> Self {
        Self {
            movers_url: "https://api.bseindia.com/BseIndiaAPI/api/MktRGainerLoserData/w\
                         ?IndxGrp=AllMkt&IndxGrpval=AllMkt&orderby=all"
                .into(),
            scrip_codes_url: "https://api.bseindia.com/BseIndiaAPI/api/ListofScripData/w\
                              ?Group=&Scripcode=&industry=&segment=Equity&status=Active"
                .into(),
            referer: "https://www.bseindia.com/".into(),
            user_agent: CHROME_USER_AGENT.into(),
            timeout_secs: 10,
            update_codes: true,
            code_refresh_secs: 24 * 60 * 60,
        }
    }
}

impl BseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn code_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.code_refresh_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Read(String),

    #[error("invalid config: {0}")]
    Parse(String),
}
