use clap::{Parser, ValueEnum};
use shortie_generator::{Generator, RandomGenerator, SeqGenerator};
use shortie_storage::StorageConfig;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const LISTEN_ADDR_ENV: &str = "SHORTIE_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "SHORTIE_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "SHORTIE_STORAGE_BACKEND";
pub const FILE_STORAGE_PATH_ENV: &str = "SHORTIE_FILE_STORAGE_PATH";
pub const DATABASE_DSN_ENV: &str = "SHORTIE_DATABASE_DSN";
pub const COOKIE_SECRET_ENV: &str = "SHORTIE_COOKIE_SECRET";
pub const LOG_FORMAT_ENV: &str = "SHORTIE_LOG_FORMAT";
pub const GENERATOR_ENV: &str = "SHORTIE_GENERATOR";
pub const GENERATOR_PREFIX_ENV: &str = "SHORTIE_GENERATOR_PREFIX";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_GENERATOR_PREFIX: &str = "wh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "file")]
    File,
    #[value(name = "postgres")]
    Postgres,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::File => write!(f, "file"),
            StorageBackendArg::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GeneratorArg {
    /// 12 hex chars from the OS random source.
    #[default]
    Random,
    /// Prefixed counter restarting at zero. Collides with its own earlier ids
    /// against a durable store.
    Seq,
}

impl Display for GeneratorArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorArg::Random => write!(f, "random"),
            GeneratorArg::Seq => write!(f, "seq"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{backend} storage requires {setting}")]
    MissingSetting {
        backend: StorageBackendArg,
        setting: &'static str,
    },
}

#[derive(Debug, Parser)]
#[command(name = "shortie")]
pub struct CLI {
    #[arg(short = 'a', long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public prefix of every returned short URL.
    #[arg(short = 'b', long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Storage backend; inferred from the DSN and file path when omitted.
    #[arg(long, env = STORAGE_BACKEND_ENV, value_enum)]
    pub storage: Option<StorageBackendArg>,

    #[arg(short = 'f', long, env = FILE_STORAGE_PATH_ENV)]
    pub file_storage_path: Option<PathBuf>,

    #[arg(short = 'd', long, env = DATABASE_DSN_ENV)]
    pub database_dsn: Option<String>,

    /// Secret signing the owner cookie. A random one is used when unset.
    #[arg(long, env = COOKIE_SECRET_ENV, hide_env_values = true)]
    pub cookie_secret: Option<String>,

    /// Short id generator.
    #[arg(long, env = GENERATOR_ENV, value_enum, default_value_t = GeneratorArg::Random)]
    pub generator: GeneratorArg,

    /// Prefix of ids handed out by the `seq` generator.
    #[arg(long, env = GENERATOR_PREFIX_ENV, default_value = DEFAULT_GENERATOR_PREFIX)]
    pub generator_prefix: String,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CLI {
    /// The backend to run against.
    ///
    /// Without an explicit `--storage`, a DSN selects postgres, then a file
    /// path selects the snapshot file, else everything stays in memory.
    pub fn storage_backend(&self) -> StorageBackendArg {
        self.storage.unwrap_or(match (&self.database_dsn, &self.file_storage_path) {
            (Some(_), _) => StorageBackendArg::Postgres,
            (None, Some(_)) => StorageBackendArg::File,
            (None, None) => StorageBackendArg::InMemory,
        })
    }

    pub fn generator(&self) -> Arc<dyn Generator> {
        match self.generator {
            GeneratorArg::Random => Arc::new(RandomGenerator::new()),
            GeneratorArg::Seq => Arc::new(SeqGenerator::with_prefix(&self.generator_prefix)),
        }
    }

    pub fn storage_config(&self) -> Result<StorageConfig, ConfigError> {
        let backend = self.storage_backend();
        match backend {
            StorageBackendArg::InMemory => Ok(StorageConfig::InMemory),
            StorageBackendArg::File => self
                .file_storage_path
                .clone()
                .map(|path| StorageConfig::File { path })
                .ok_or(ConfigError::MissingSetting {
                    backend,
                    setting: "--file-storage-path",
                }),
            StorageBackendArg::Postgres => self
                .database_dsn
                .clone()
                .map(|dsn| StorageConfig::Postgres { dsn })
                .ok_or(ConfigError::MissingSetting {
                    backend,
                    setting: "--database-dsn",
                }),
        }
    }
}
