//! Domain layer for the agent response cache
//!
//! This module contains the cache's data model, its error taxonomy and the
//! port through which the store is reached.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CacheError, CacheResult};
