//! Crawler module for catalogue harvesting
//!
//! This module contains the crawl engine, including:
//! - Per-worker HTTP sessions
//! - Listing page enumeration
//! - Page prefix selection and interleaved work partitioning
//! - Extraction workers with tolerant field defaults
//! - Job coordination, cap enforcement and export

mod coordinator;
mod enumerator;
mod guard;
mod parser;
mod partitioner;
mod session;
mod worker;

pub use coordinator::{run_job, Coordinator, CrawlJob, JobParams, JobReport};
pub use enumerator::{enumerate_pages, page_refs};
pub use guard::{JobPermit, JobSlot};
pub use parser::{parse_detail, parse_listing, parse_page_count};
pub use partitioner::{available_parallelism, needed_pages, partition, worker_count, WorkPlan};
pub use session::{build_http_client, user_agent_string, FetchResult, Session};
pub use worker::Worker;
