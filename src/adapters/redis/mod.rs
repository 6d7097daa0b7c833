//! Redis-backed cache store adapter.

pub mod connection;
pub mod store;

pub use connection::{connect, open_client, verify_connection, ConnectionSettings};
pub use store::RedisCacheStore;
