//! Configuration module for Skein
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use skein::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("skein.toml")).unwrap();
//! println!("Crawler will claim up to depth {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, EmptyFrontierPolicy, FrontierConfig, LinksConfig, StoreConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
