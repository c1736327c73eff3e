//! Request gate: the single admission check the HTTP layer runs before
//! any captioning, rendering or uploading.
//!
//! The quota write is durable by the time `admit` returns, so work done
//! after admission is always counted even if it later fails.

use std::path::Path;
use std::sync::Arc;

use vibe_protocol::{Admission, Clock, WhoAmI};

use crate::identity::IdentityStore;
use crate::quota::QuotaLedger;
use crate::resolver::FingerprintResolver;
use crate::StateError;

#[derive(Clone)]
pub struct RequestGate {
    resolver: FingerprintResolver,
    ledger: Arc<QuotaLedger>,
}

impl RequestGate {
    pub fn new(identity: Arc<IdentityStore>, ledger: Arc<QuotaLedger>) -> Self {
        Self {
            resolver: FingerprintResolver::new(identity),
            ledger,
        }
    }

    /// Gate over file-backed stores in `data_dir`.
    pub fn open(data_dir: &Path, daily_limit: u32) -> Self {
        Self::new(
            Arc::new(IdentityStore::open(data_dir)),
            Arc::new(QuotaLedger::open(data_dir, daily_limit)),
        )
    }

    /// Gate over in-memory stores driven by `clock`.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(IdentityStore::in_memory()),
            Arc::new(QuotaLedger::in_memory(clock)),
        )
    }

    /// Resolve the caller and charge one request against today's quota.
    pub fn admit(
        &self,
        client_token: Option<&str>,
        fallback_address: &str,
    ) -> Result<Admission, StateError> {
        let identifier = self.resolver.resolve(client_token, fallback_address)?;
        let allowed = self.ledger.check_and_consume(&identifier)?;
        if allowed {
            tracing::info!(identifier = %identifier, "request admitted");
        } else {
            tracing::warn!(
                identifier = %identifier,
                limit = self.ledger.daily_limit(),
                "daily quota exhausted"
            );
        }
        Ok(Admission { identifier, allowed })
    }

    /// Display name and remaining credits for the caller, without charging.
    pub fn whoami(
        &self,
        client_token: Option<&str>,
        fallback_address: &str,
    ) -> Result<WhoAmI, StateError> {
        let identifier = self.resolver.resolve(client_token, fallback_address)?;
        let name = self.name_for(&identifier)?;
        let credits_left = self.remaining(&identifier)?;
        Ok(WhoAmI { identifier, name, credits_left })
    }

    pub fn remaining(&self, identifier: &str) -> Result<u32, StateError> {
        self.ledger.remaining(identifier)
    }

    pub fn name_for(&self, identifier: &str) -> Result<String, StateError> {
        self.resolver.identity().name_for(identifier)
    }

    /// Administrative: clear every quota entry.
    pub fn reset_quotas(&self) -> Result<(), StateError> {
        self.ledger.reset_all()?;
        tracing::info!("all quotas reset");
        Ok(())
    }
}
