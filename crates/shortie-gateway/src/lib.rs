//! HTTP front end for the shortener.
//!
//! Exposes the shortening, redirect and owner listing routes over axum and
//! identifies callers through a signed `auth_token` cookie.

pub mod app;
pub mod auth;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
