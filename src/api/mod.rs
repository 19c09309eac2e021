//! HTTP API layer.
//!
//! Translates HTTP requests into link service calls and formats responses.
//!
//! # Modules
//!
//! - [`dto`] - Request/response bodies
//! - [`extract`] - Form and multipart body extraction
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Canonical host, authentication and tracing middleware
//! - [`routes`] - Route configuration

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
