//! # Ephemeral Shortener
//!
//! A self-hosted link shortener whose links expire. Everything lives in memory:
//! restarting the process forgets every link.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Identifiers, the expiring store and its reaper
//! - **Application Layer** ([`application`]) - Link creation and token checks
//! - **API Layer** ([`api`]) - HTTP handlers, DTOs, and middleware
//! - **Client** ([`client`]) - Programmatic access to the creation endpoint
//!
//! ## Features
//!
//! - 8-character identifiers from `a-z0-9`, drawn from the OS random source
//! - Per-link lifetime with a configurable default
//! - Background sweep of expired links every 30 seconds
//! - Shared-secret authentication against a stored SHA-256 digest
//! - Canonical host enforcement
//! - Optional HTTPS and a plain HTTP listener redirecting to the canonical host
//!
//! ## Quick Start
//!
//! ```bash
//! export TOKEN_SHA256="$(cargo run -q --bin admin -- token hash my-secret)"
//! export CANONICAL_HOST="https://s.example.com"
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod client;
pub mod domain;
pub mod error;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{AuthService, CreatedLink, LinkService};
    pub use crate::domain::{Entry, ExpiringStore, Identifier, Reaper, ReaperStats};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
