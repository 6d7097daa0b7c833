//! Infrastructure layer module
//!
//! This module contains the ambient integrations the cache runs on:
//! - Configuration management
//! - Logging infrastructure
//!
//! Store adapters live in `crate::adapters`.

pub mod config;
pub mod logging;
