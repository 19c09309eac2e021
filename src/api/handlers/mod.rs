//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod redirect;
pub mod shorten;

pub use health::health_handler;
pub use redirect::{
    canonical_redirect_handler, index_handler, permanent_redirect, redirect_handler,
};
pub use shorten::shorten_handler;
