//! Domain errors for the agent response cache.

use thiserror::Error;

/// Errors raised along the caching path.
///
/// None of these ever reach a caller of
/// [`ResponseCache::get_or_compute`](crate::services::ResponseCache::get_or_compute):
/// the orchestrator recovers from each of them locally by bypassing the store.
/// They do surface from operator operations such as invalidation.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cached entry could not be decoded: {0}")]
    Decode(String),

    #[error("Response could not be encoded: {0}")]
    Encode(String),

    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),
}

impl CacheError {
    /// Short label used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyDerivation(_) => "key_derivation",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::InvalidConfiguration(_) => "invalid_configuration",
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}
