use thiserror::Error;

/// Errors raised while interpreting client-supplied values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown vibe '{0}', expected one of: wholesome, spicy, savage")]
    UnknownVibe(String),

    #[error("invalid day stamp '{0}': {1}")]
    InvalidDay(String, String),
}
