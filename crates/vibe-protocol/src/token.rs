//! Composite device token: `<stable fingerprint>-<volatile storage token>`.
//!
//! The client builds the stable half from device characteristics and the
//! volatile half from local storage, which the user can clear at will.

use crate::TOKEN_DELIMITER;

/// A device token split on its first delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceToken<'a> {
    pub stable: &'a str,
    pub volatile: &'a str,
}

impl<'a> DeviceToken<'a> {
    /// Split `raw` into its stable and volatile parts.
    ///
    /// Returns `None` when there is no delimiter; such tokens are used
    /// verbatim as identifiers. A leading delimiter yields an empty stable part.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let (stable, volatile) = raw.split_once(TOKEN_DELIMITER)?;
        Some(Self { stable, volatile })
    }
}
