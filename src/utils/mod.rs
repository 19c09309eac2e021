//! Utility functions shared by the HTTP layer, configuration and client.
//!
//! - [`canonical_host`] - Canonical base URL and `Host` header matching
//! - [`duration`] - Duration string parsing and formatting

pub mod canonical_host;
pub mod duration;
