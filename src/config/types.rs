use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Catalogue site layout
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Catalogue root page; carries the pagination indicator
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Listing page path relative to the root, with a `{page}` placeholder
    #[serde(rename = "page-path-template", default = "default_page_path_template")]
    pub page_path_template: String,

    /// Average number of items on one listing page
    #[serde(rename = "items-per-page", default = "default_items_per_page")]
    pub items_per_page: usize,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Default item cap for a job
    #[serde(rename = "max-items")]
    pub max_items: usize,

    /// Upper bound on the worker pool size
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Publish a progress snapshot every N collected items
    #[serde(rename = "progress-step", default = "default_progress_step")]
    pub progress_step: usize,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the exported dataset
    #[serde(rename = "export-path")]
    pub export_path: PathBuf,

    /// Format of the exported dataset
    #[serde(rename = "export-format", default)]
    pub export_format: ExportFormat,

    /// Path of the JSON progress snapshot read by pollers
    #[serde(rename = "progress-path")]
    pub progress_path: PathBuf,
}

/// Spreadsheet format of the export artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

fn default_page_path_template() -> String {
    "catalogue/page-{page}.html".to_string()
}

fn default_items_per_page() -> usize {
    20
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_progress_step() -> usize {
    5
}
