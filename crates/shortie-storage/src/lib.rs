mod index;

pub mod backend;
pub mod file;
pub mod memory;
pub mod postgres;

#[cfg(test)]
mod contract;

pub use backend::{open_repository, StorageConfig};
pub use file::FileRepository;
pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

pub use shortie_core::repository::{ReadRepository, Repository};
pub use shortie_core::StorageError;
