//! Infrastructure layer - external integrations
//!
//! This module contains implementations for:
//! - HTTP access to the shop backend
//! - Runtime bridge (async/sync integration)

pub mod http;
pub mod runtime;

pub use http::HttpBackend;
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
