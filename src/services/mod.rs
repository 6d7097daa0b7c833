//! Service layer: the caching components composed by the orchestrator.

pub mod codec;
pub mod invalidation;
pub mod key_deriver;
pub mod response_cache;

pub use codec::{ResponseCodec, ENVELOPE_FORMAT};
pub use invalidation::InvalidationController;
pub use key_deriver::{KeyDeriver, NormalizedRequest};
pub use response_cache::{CacheStats, ResponseCache};
