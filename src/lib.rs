//! Catalog-Harvest: a bounded product catalogue harvester
//!
//! This crate crawls a paginated catalogue site, extracts one record per product
//! detail page with tolerant field defaults, reports progress to an external
//! snapshot slot, and exports a dataset that never exceeds the requested cap.

pub mod catalogue;
pub mod config;
pub mod crawler;
pub mod output;
pub mod progress;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalogue root {url} is unreachable: {message}")]
    SourceUnreachable { url: String, message: String },

    #[error("Failed to load listing page {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("A crawl worker stopped unexpectedly: {0}")]
    Worker(String),

    #[error("A harvest job is already running")]
    AlreadyRunning,

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalogue::{ListingItem, PageRef, ProductRecord};
pub use config::Config;
pub use crawler::{run_job, JobParams, JobReport, JobSlot};
pub use progress::{read_snapshot, ProgressState};
