//! Application layer services implementing business logic.
//!
//! Services sit between the HTTP handlers and the store, so handlers never
//! touch the mapping or its lock directly.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::auth_service::AuthService`] - Secret token verification

pub mod services;
