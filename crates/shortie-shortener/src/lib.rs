//! URL shortener service implementation.
//!
//! This crate runs the id allocation protocols on top of any
//! [`Repository`](shortie_core::Repository) and
//! [`Generator`](shortie_generator::Generator). Core types are re-exported
//! from `shortie_core`.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::ShortenerError;
pub use service::{ShortenerService, MAX_ATTEMPTS};
pub use shortener::{BatchItem, BatchShortened, OwnedUrl, Shortened, Shortener};
pub use shortie_core::{OwnerId, ShortId};
