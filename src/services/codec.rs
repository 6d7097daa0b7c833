//! Serialization codec for cached agent responses.
//!
//! Responses are stored as a small JSON envelope:
//!
//! ```json
//! {"format": 1, "stored_at": "2026-10-17T09:30:00Z", "response": { ... }}
//! ```
//!
//! Anything that fails to parse into the expected envelope and response shape
//! is reported as [`CacheError::Decode`], which callers treat as a miss.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::CachedResponse;

/// Envelope format written by this codec.
pub const ENVELOPE_FORMAT: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, R> {
    format: u32,
    stored_at: DateTime<Utc>,
    response: &'a R,
}

#[derive(Deserialize)]
struct Envelope<R> {
    format: u32,
    stored_at: DateTime<Utc>,
    response: R,
}

/// Stateless JSON envelope codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseCodec;

impl ResponseCodec {
    pub fn new() -> Self {
        Self
    }

    /// Encode a response stamped with the current time.
    pub fn encode<R: Serialize>(&self, response: &R) -> CacheResult<Vec<u8>> {
        self.encode_at(response, Utc::now())
    }

    /// Encode a response stamped with `stored_at`.
    pub fn encode_at<R: Serialize>(
        &self,
        response: &R,
        stored_at: DateTime<Utc>,
    ) -> CacheResult<Vec<u8>> {
        serde_json::to_vec(&EnvelopeRef {
            format: ENVELOPE_FORMAT,
            stored_at,
            response,
        })
        .map_err(|e| CacheError::Encode(e.to_string()))
    }

    /// Decode just the response.
    pub fn decode<R: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<R> {
        self.decode_entry(bytes).map(|cached| cached.response)
    }

    /// Decode the response together with its write time.
    pub fn decode_entry<R: DeserializeOwned>(&self, bytes: &[u8]) -> CacheResult<CachedResponse<R>> {
        let envelope: Envelope<R> =
            serde_json::from_slice(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;

        if envelope.format != ENVELOPE_FORMAT {
            return Err(CacheError::Decode(format!(
                "unsupported envelope format {} (expected {})",
                envelope.format, ENVELOPE_FORMAT
            )));
        }

        Ok(CachedResponse {
            stored_at: envelope.stored_at,
            response: envelope.response,
        })
    }
}
