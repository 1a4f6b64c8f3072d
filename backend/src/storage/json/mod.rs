//! File-backed storage: one pretty-printed JSON document per key.

pub mod connection;

pub use connection::JsonConnection;
