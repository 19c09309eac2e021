//! HTTP middleware for request processing and protection.
//!
//! Provides canonical host enforcement, token authentication and request tracing.

pub mod auth;
pub mod canonical_host;
pub mod tracing;
