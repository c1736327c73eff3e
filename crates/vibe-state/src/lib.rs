//! Vibe State - durable client identity and daily quota bookkeeping
//!
//! Every store is a JSON document rewritten whole on each mutation.
//! Mutations run under the document's lock so concurrent requests for
//! the same identifier cannot lose updates.

pub mod codename;
pub mod document;
pub mod gate;
pub mod identity;
pub mod quota;
pub mod resolver;

pub use document::{Document, DocumentBackend, FileBackend, MemoryBackend, Outcome};
pub use gate::RequestGate;
pub use identity::IdentityStore;
pub use quota::QuotaLedger;
pub use resolver::FingerprintResolver;

/// Errors from the durable state layer.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}
