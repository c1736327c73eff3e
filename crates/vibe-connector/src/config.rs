//! Connector configuration, loaded from TOML with per-field defaults.
//!
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0:8000"
//! allowed_origins = ["http://localhost:5173"]
//!
//! [storage]
//! data_dir = "./data"
//!
//! [quota]
//! daily_limit = 10
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vibe_protocol::{Vibe, DAILY_LIMIT};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("invalid config {path}: {reason}")]
    Parse { path: String, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub caption: CaptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Browser origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Take the client address from the first `X-Forwarded-For` entry.
    /// Only enable behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".into(),
            allowed_origins: vec![
                "http://localhost:5173".into(),
                "https://meme-aunty.vercel.app".into(),
            ],
            trust_forwarded_for: false,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the fingerprint, name and quota documents.
    pub data_dir: PathBuf,
    /// Where finished memes are written and served from.
    pub meme_dir: PathBuf,
    /// Public URL prefix under which `meme_dir` is reachable.
    pub public_base_url: String,
    pub event_log: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            meme_dir: PathBuf::from("./data/memes"),
            public_base_url: "http://localhost:8000/memes".into(),
            event_log: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub daily_limit: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { daily_limit: DAILY_LIMIT }
    }
}

/// Captions returned by the built-in captioner, per vibe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    pub captions: BTreeMap<String, String>,
    pub fallback_caption: String,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        let captions = BTreeMap::from([
            (Vibe::Wholesome.to_string(), "When the samosa is fresh and the chai is perfect".to_string()),
            (Vibe::Spicy.to_string(), "POV: your friend who said 'bas ek drink' at 7pm and it's now 3am".to_string()),
            (Vibe::Savage.to_string(), "Me explaining my 5 year plan with 0 years of planning".to_string()),
        ]);
        Self {
            captions,
            fallback_caption: "When the meme writes itself".into(),
        }
    }
}

impl CaptionConfig {
    pub fn caption_for(&self, vibe: Vibe) -> &str {
        self.captions
            .get(vibe.as_str())
            .map(String::as_str)
            .unwrap_or(&self.fallback_caption)
    }
}

impl ConnectorConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&raw).map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }
}
