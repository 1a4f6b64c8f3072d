//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain. It translates
//! requests into domain commands and domain results into the wire DTOs of
//! the `shared` crate.
//!
//! ## Current Implementation
//!
//! - **Web Framework**: Axum
//! - **Serialization**: Serde JSON
//! - **State Management**: services shared through [`crate::AppState`]

pub mod rest;

pub use rest::api_router;
