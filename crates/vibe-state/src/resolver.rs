//! Maps an untrusted device token to the identifier quota is charged to.
//!
//! Only the stable fingerprint is used as the identifier; the volatile
//! half is recorded but never changes the result, so clearing local
//! storage on the client does not buy a fresh quota.

use std::sync::Arc;

use vibe_protocol::DeviceToken;

use crate::identity::{IdentityStore, Sighting};
use crate::StateError;

#[derive(Clone)]
pub struct FingerprintResolver {
    identity: Arc<IdentityStore>,
}

impl FingerprintResolver {
    pub fn new(identity: Arc<IdentityStore>) -> Self {
        Self { identity }
    }

    /// Canonical identifier for a request.
    ///
    /// - no token (or empty): `fallback_address`, nothing persisted
    /// - token without a delimiter: the token itself, nothing persisted
    /// - otherwise: the stable fingerprint, recording the volatile half
    pub fn resolve(
        &self,
        client_token: Option<&str>,
        fallback_address: &str,
    ) -> Result<String, StateError> {
        let raw = match client_token {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(fallback_address.to_string()),
        };

        let Some(token) = DeviceToken::parse(raw) else {
            tracing::debug!(token = raw, "device token has no delimiter, using it verbatim");
            return Ok(raw.to_string());
        };

        match self.identity.observe(token.stable, token.volatile)? {
            Sighting::NewFingerprint => {
                tracing::debug!(fingerprint = token.stable, "recorded new device fingerprint");
            }
            Sighting::NewToken => {
                tracing::info!(
                    fingerprint = token.stable,
                    "known fingerprint presented a new storage token"
                );
            }
            Sighting::Known => {}
        }
        Ok(token.stable.to_string())
    }

    pub fn identity(&self) -> &Arc<IdentityStore> {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryBackend;

    fn resolver_with_backend() -> (FingerprintResolver, Arc<MemoryBackend>) {
        let fps = Arc::new(MemoryBackend::new());
        let identity = IdentityStore::with_backends(fps.clone(), Arc::new(MemoryBackend::new()));
        (FingerprintResolver::new(Arc::new(identity)), fps)
    }

    #[test]
    fn test_empty_token_falls_back_to_address() {
        let (r, fps) = resolver_with_backend();
        assert_eq!(r.resolve(Some(""), "9.9.9.9").unwrap(), "9.9.9.9");
        assert_eq!(fps.writes(), 0);
    }

    #[test]
    fn test_token_is_not_trimmed() {
        let (r, _) = resolver_with_backend();
        assert_eq!(r.resolve(Some(" fp-a"), "9.9.9.9").unwrap(), " fp");
        assert_eq!(r.resolve(Some("   "), "9.9.9.9").unwrap(), "   ");
    }

    #[test]
    fn test_token_without_delimiter_is_verbatim() {
        let (r, fps) = resolver_with_backend();
        assert_eq!(r.resolve(Some("opaque"), "9.9.9.9").unwrap(), "opaque");
        assert_eq!(fps.writes(), 0);
    }

    #[test]
    fn test_leading_delimiter_records_empty_fingerprint() {
        let (r, fps) = resolver_with_backend();
        assert_eq!(r.resolve(Some("-tokA"), "9.9.9.9").unwrap(), "");
        assert_eq!(r.resolve(Some("-tokB"), "9.9.9.9").unwrap(), "");
        assert_eq!(r.identity().tokens_for(""), vec!["tokA".to_string(), "tokB".to_string()]);
        assert_eq!(fps.writes(), 2);
    }
}
