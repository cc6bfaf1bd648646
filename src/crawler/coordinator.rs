//! Crawler coordinator - job orchestration
//!
//! This module runs one harvest job end to end:
//! - Resetting the progress slot and starting the progress publisher
//! - Enumerating listing pages and planning the page prefix
//! - Running the worker pool, one session per worker
//! - Merging worker output in worker order and enforcing the cap
//! - Exporting the final dataset before completion is published

use crate::catalogue::ProductRecord;
use crate::config::{validate_worker_count, Config, ExportFormat};
use crate::crawler::enumerator::enumerate_pages;
use crate::crawler::guard::JobPermit;
use crate::crawler::partitioner::{available_parallelism, needed_pages, partition, WorkPlan};
use crate::crawler::session::Session;
use crate::crawler::worker::Worker;
use crate::output::{collect_records, export_records};
use crate::progress::{ProgressSink, ProgressTracker, SnapshotFile};
use crate::HarvestError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Parameters of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobParams {
    /// Maximum number of records to return
    pub cap: usize,

    /// Upper bound on the worker pool size
    pub worker_count: usize,
}

impl JobParams {
    /// Parameters taken from the configuration defaults
    pub fn from_config(config: &Config) -> Self {
        Self {
            cap: config.crawler.max_items,
            worker_count: config.crawler.max_workers,
        }
    }
}

/// Outcome of a successful job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub items_collected: usize,
    pub elapsed_seconds: f64,
    #[serde(skip)]
    pub records: Vec<ProductRecord>,
    pub artifact: Option<PathBuf>,
}

/// A planned job: the cap and the pages each worker will crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub cap: usize,
    pub plan: WorkPlan,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    params: JobParams,
    sink: Arc<dyn ProgressSink>,
    export: Option<(PathBuf, ExportFormat)>,
}

impl Coordinator {
    /// Creates a coordinator for one job
    ///
    /// # Errors
    ///
    /// * `HarvestError::Config` - the worker count is out of range
    pub fn new(
        config: Config,
        params: JobParams,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Self, HarvestError> {
        validate_worker_count(params.worker_count)?;

        Ok(Self {
            config: Arc::new(config),
            params,
            sink,
            export: None,
        })
    }

    /// Writes the capped dataset to `path` before the job reports completion
    pub fn with_export(mut self, path: impl Into<PathBuf>, format: ExportFormat) -> Self {
        self.export = Some((path.into(), format));
        self
    }

    /// Export target, if one was configured
    pub fn export_path(&self) -> Option<&Path> {
        self.export.as_ref().map(|(path, _)| path.as_path())
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.crawler.request_timeout_secs)
    }

    /// Runs the job and returns at most `cap` records
    ///
    /// Records are ordered by worker index, then by discovery order within each
    /// worker. The `permit` shows the caller holds the single job slot.
    ///
    /// The completion snapshot is only published once the records are exported;
    /// a failed export leaves the slot at the job's computed percentage.
    pub async fn run(&self, _permit: &JobPermit<'_>) -> Result<Vec<ProductRecord>, HarvestError> {
        tracing::info!(
            "Starting harvest: cap {}, up to {} workers",
            self.params.cap,
            self.params.worker_count
        );

        let tracker = ProgressTracker::start(
            self.params.cap,
            self.config.crawler.progress_step,
            Arc::clone(&self.sink),
        );

        let outcome = self.crawl(&tracker).await.and_then(|records| {
            self.export(&records)?;
            Ok(records)
        });

        match outcome {
            Ok(records) => {
                let last = tracker.finish(true).await;
                tracing::info!(
                    "Harvest complete: {} items emitted, {} kept",
                    last.current,
                    records.len()
                );
                Ok(records)
            }
            Err(e) => {
                tracker.finish(false).await;
                tracing::error!("Harvest failed: {}", e);
                Err(e)
            }
        }
    }

    fn export(&self, records: &[ProductRecord]) -> Result<(), HarvestError> {
        if let Some((path, format)) = &self.export {
            export_records(records, path, *format)?;
        }
        Ok(())
    }

    /// Enumerates the catalogue and plans the page prefix for the cap
    pub async fn plan(&self) -> Result<CrawlJob, HarvestError> {
        let needed = needed_pages(self.params.cap, self.config.source.items_per_page);
        let pages = {
            let session = Session::open("enumerator", &self.config.user_agent, self.request_timeout())?;
            enumerate_pages(&session, &self.config.source, needed).await?
        };

        let plan = partition(
            &pages,
            self.params.cap,
            self.config.source.items_per_page,
            self.params.worker_count,
            available_parallelism(),
        );

        tracing::info!(
            "Crawling {} listing pages with {} workers",
            plan.page_count(),
            plan.worker_count()
        );

        Ok(CrawlJob {
            cap: self.params.cap,
            plan,
        })
    }

    /// Runs the worker pool and returns the merged records, cut to the cap
    async fn crawl(&self, tracker: &ProgressTracker) -> Result<Vec<ProductRecord>, HarvestError> {
        let job = self.plan().await?;
        let worker_count = job.plan.worker_count();

        // Dropping the set aborts every worker still running.
        let mut workers = JoinSet::new();
        for (index, pages) in job.plan.assignments.into_iter().enumerate() {
            let session = Session::open(
                format!("worker-{}", index),
                &self.config.user_agent,
                self.request_timeout(),
            )?;
            let worker = Worker::new(index, session, pages, tracker.handle());
            workers.spawn(async move { (index, worker.run().await) });
        }

        let mut results: Vec<Option<Vec<ProductRecord>>> = vec![None; worker_count];
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, Ok(records))) => results[index] = Some(records),
                Ok((index, Err(e))) => {
                    tracing::error!("Worker {} failed, stopping the job", index);
                    workers.shutdown().await;
                    return Err(e);
                }
                Err(e) => {
                    workers.shutdown().await;
                    return Err(HarvestError::Worker(e.to_string()));
                }
            }
        }

        let per_worker = results.into_iter().flatten().collect();
        Ok(collect_records(per_worker, job.cap))
    }
}

/// Runs one job with the configured progress slot and export artifact
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `params` - Cap and worker bound for this invocation
/// * `permit` - The caller's claim on the single job slot
///
/// # Returns
///
/// * `Ok(JobReport)` - Records, timing and the artifact path
/// * `Err(HarvestError)` - The catalogue or a listing page was unreachable,
///   or the artifact could not be written
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::load_config;
/// use catalog_harvest::crawler::{run_job, JobParams, JobSlot};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let slot = JobSlot::new();
/// let permit = slot.try_acquire()?;
/// let report = run_job(&config, JobParams { cap: 20, worker_count: 2 }, &permit).await?;
/// println!("{} items", report.items_collected);
/// # Ok(())
/// # }
/// ```
pub async fn run_job(
    config: &Config,
    params: JobParams,
    permit: &JobPermit<'_>,
) -> Result<JobReport, HarvestError> {
    let started = Instant::now();

    let sink = Arc::new(SnapshotFile::new(&config.output.progress_path));
    let coordinator = Coordinator::new(config.clone(), params, sink)?
        .with_export(config.output.export_path.clone(), config.output.export_format);
    let records = coordinator.run(permit).await?;

    Ok(JobReport {
        items_collected: records.len(),
        elapsed_seconds: started.elapsed().as_secs_f64(),
        records,
        artifact: coordinator.export_path().map(Path::to_path_buf),
    })
}
