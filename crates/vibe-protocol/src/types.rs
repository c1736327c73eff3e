use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Caption tone requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    Wholesome,
    Spicy,
    Savage,
}

impl Vibe {
    pub const ALL: [Vibe; 3] = [Vibe::Wholesome, Vibe::Spicy, Vibe::Savage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wholesome => "wholesome",
            Self::Spicy => "spicy",
            Self::Savage => "savage",
        }
    }
}

impl std::fmt::Display for Vibe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Vibe {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Vibe::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| ProtocolError::UnknownVibe(s.to_string()))
    }
}

/// Per-identifier usage for one UTC day.
///
/// Persisted as `{ "date": "YYYY-MM-DD", "count": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaEntry {
    pub date: NaiveDate,
    pub count: u32,
}

impl QuotaEntry {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }

    /// True when the entry was written on `today`.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.date == today
    }

    pub fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.count)
    }
}

/// Outcome of gating one inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    /// Canonical identifier the request was counted against.
    pub identifier: String,
    pub allowed: bool,
}

/// Display identity and remaining budget for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmI {
    #[serde(skip_serializing, default)]
    pub identifier: String,
    pub name: String,
    pub credits_left: u32,
}
