//! Append-only NDJSON log of generated captions.
//!
//! One `MemeEvent` per line. Failures are reported to the caller, which
//! logs them and carries on; the log never blocks a meme.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use vibe_protocol::Vibe;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemeEvent {
    pub timestamp: DateTime<Utc>,
    pub identifier: String,
    pub vibe: Vibe,
    pub caption: String,
}

impl MemeEvent {
    pub fn now(identifier: &str, vibe: Vibe, caption: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            identifier: identifier.to_string(),
            vibe,
            caption: caption.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub struct EventLog {
    path: Option<PathBuf>,
    lock: Mutex<()>,
}

impl EventLog {
    pub fn ndjson(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            lock: Mutex::new(()),
        }
    }

    /// Log that discards every event.
    pub fn disabled() -> Self {
        Self { path: None, lock: Mutex::new(()) }
    }

    pub async fn append(&self, event: &MemeEvent) -> Result<(), EventLogError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut line = serde_json::to_string(event)
            .map_err(|e| EventLogError::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.lock.lock().await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EventLogError::Io(e.to_string()))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| EventLogError::Io(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| EventLogError::Io(e.to_string()))?;
        file.flush().await.map_err(|e| EventLogError::Io(e.to_string()))
    }

    /// Every event recorded so far; unparseable lines are skipped.
    pub async fn read_all(&self) -> Result<Vec<MemeEvent>, EventLogError> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EventLogError::Io(e.to_string())),
        };
        Ok(raw
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect())
    }
}
