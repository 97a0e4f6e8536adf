//! Core types and traits for the Shortie URL shortener.
//!
//! This crate defines the mapping store contract shared by every storage
//! backend, the identifier types flowing through it, and the sentinel
//! errors the allocation protocols interpret.

pub mod error;
pub mod owner;
pub mod repository;
pub mod short_id;

pub use error::{CoreError, StorageError};
pub use owner::OwnerId;
pub use repository::{ReadRepository, Repository, UrlMapping, UrlRecord};
pub use short_id::ShortId;
