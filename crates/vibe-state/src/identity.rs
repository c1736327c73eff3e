//! Identity store: fingerprint records and pseudonymous display names.
//!
//! - `device_fingerprints.json`: `{ fingerprint: [volatile, ...] }`
//! - `ip_names.json`: `{ identifier: name }`
//!
//! Both maps only grow. A recorded fingerprint is never removed and a
//! display name, once assigned, never changes.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use vibe_protocol::{FINGERPRINT_DOCUMENT, NAME_DOCUMENT, NAME_WORDS};

use crate::codename::generate_unique_slug;
use crate::document::{Document, DocumentBackend, Outcome};
use crate::StateError;

/// Stable fingerprint → volatile tokens seen alongside it.
pub type FingerprintMap = BTreeMap<String, Vec<String>>;

/// Identifier → display name.
pub type NameMap = BTreeMap<String, String>;

/// What `observe` did to the fingerprint map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
    /// First time this fingerprint was seen.
    NewFingerprint,
    /// Known fingerprint, previously unseen volatile token.
    NewToken,
    /// Both already recorded; nothing written.
    Known,
}

pub struct IdentityStore {
    fingerprints: Document<FingerprintMap>,
    names: Document<NameMap>,
}

impl IdentityStore {
    pub fn new(fingerprints: Document<FingerprintMap>, names: Document<NameMap>) -> Self {
        Self { fingerprints, names }
    }

    /// File-backed store under `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        Self::new(
            Document::file(data_dir.join(FINGERPRINT_DOCUMENT)),
            Document::file(data_dir.join(NAME_DOCUMENT)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Document::memory(FINGERPRINT_DOCUMENT),
            Document::memory(NAME_DOCUMENT),
        )
    }

    /// Store over caller-supplied backends.
    pub fn with_backends(
        fingerprints: Arc<dyn DocumentBackend>,
        names: Arc<dyn DocumentBackend>,
    ) -> Self {
        Self::new(
            Document::new(FINGERPRINT_DOCUMENT, fingerprints),
            Document::new(NAME_DOCUMENT, names),
        )
    }

    /// Record that `stable` was presented with `volatile`.
    pub fn observe(&self, stable: &str, volatile: &str) -> Result<Sighting, StateError> {
        self.fingerprints.update(|map| match map.get_mut(stable) {
            None => {
                map.insert(stable.to_string(), vec![volatile.to_string()]);
                Outcome::Dirty(Sighting::NewFingerprint)
            }
            Some(tokens) if !tokens.iter().any(|t| t == volatile) => {
                tokens.push(volatile.to_string());
                Outcome::Dirty(Sighting::NewToken)
            }
            Some(_) => Outcome::Unchanged(Sighting::Known),
        })
    }

    /// Volatile tokens recorded for `stable`, in first-seen order.
    pub fn tokens_for(&self, stable: &str) -> Vec<String> {
        self.fingerprints.read().remove(stable).unwrap_or_default()
    }

    pub fn fingerprints(&self) -> FingerprintMap {
        self.fingerprints.read()
    }

    /// Display name for `identifier`, assigned on first call.
    pub fn name_for(&self, identifier: &str) -> Result<String, StateError> {
        self.names.update(|map| {
            if let Some(name) = map.get(identifier) {
                return Outcome::Unchanged(name.clone());
            }
            let name = {
                let taken: HashSet<&str> = map.values().map(String::as_str).collect();
                generate_unique_slug(&mut rand::thread_rng(), NAME_WORDS, &taken)
            };
            tracing::debug!(identifier, name = %name, "assigned display name");
            map.insert(identifier.to_string(), name.clone());
            Outcome::Dirty(name)
        })
    }
}
