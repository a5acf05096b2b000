//! Skein: a breadth-limited web frontier crawler
//!
//! This crate implements the concurrent core of a crawler that drains a
//! persistent frontier of addresses with a bounded pool of fetch tasks,
//! extracting links from each page and feeding newly seen addresses back
//! into the frontier.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Process exit code when the frontier has no claimable work left
pub const EXIT_FRONTIER_EXHAUSTED: i32 = 5;

/// Process exit code when the frontier cannot be read
pub const EXIT_FRONTIER_UNREADABLE: i32 = 6;

/// Process exit code when the frontier cannot be written
pub const EXIT_FRONTIER_UNWRITABLE: i32 = 7;

/// Process exit code for configuration problems
pub const EXIT_CONFIG: i32 = 2;

/// Main error type for Skein operations
#[derive(Debug, Error)]
pub enum SkeinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Frontier unreadable: {0}")]
    FrontierUnreadable(#[source] storage::StoreError),

    #[error("Frontier unwritable: {0}")]
    FrontierUnwritable(#[source] storage::StoreError),

    #[error("Storage error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl SkeinError {
    /// Classifies a fatal frontier failure by which side of the store gave out
    pub fn from_store_failure(err: storage::StoreError) -> Self {
        if err.is_write() {
            Self::FrontierUnwritable(err)
        } else {
            Self::FrontierUnreadable(err)
        }
    }

    /// Returns the process exit code this error should terminate with
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::FrontierUnreadable(_) => EXIT_FRONTIER_UNREADABLE,
            Self::FrontierUnwritable(_) => EXIT_FRONTIER_UNWRITABLE,
            _ => 1,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed address: {0}")]
    InvalidSeed(String),
}

/// Result type alias for Skein operations
pub type Result<T> = std::result::Result<T, SkeinError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::FrontierStatus;
pub use crate::url::{canonicalize, depth, domain_and_tld, AddressDigest};
