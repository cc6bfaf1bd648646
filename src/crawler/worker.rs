//! Extraction worker
//!
//! A worker walks its assigned listing pages in order, fetches every product
//! detail page it finds and turns each into a `ProductRecord`. It stops taking
//! new items once the shared counter reaches the job cap.

use crate::catalogue::{ListingItem, PageRef, ProductRecord};
use crate::crawler::parser::{parse_detail, parse_listing};
use crate::crawler::session::{FetchResult, Session};
use crate::progress::ProgressHandle;
use crate::HarvestError;

/// One member of the job's worker pool
pub struct Worker {
    index: usize,
    session: Session,
    pages: Vec<PageRef>,
    progress: ProgressHandle,
}

impl Worker {
    pub fn new(index: usize, session: Session, pages: Vec<PageRef>, progress: ProgressHandle) -> Self {
        Self {
            index,
            session,
            pages,
            progress,
        }
    }

    /// Crawls the assigned pages and returns records in discovery order
    ///
    /// Detail-page failures still produce a record; a listing page that cannot
    /// be loaded stops the worker with `HarvestError::Navigation`. The session is
    /// closed on every return path.
    pub async fn run(self) -> Result<Vec<ProductRecord>, HarvestError> {
        tracing::debug!(
            "Worker {}: assigned pages {:?}",
            self.index,
            self.pages.iter().map(PageRef::index).collect::<Vec<_>>()
        );

        let mut records = Vec::new();

        'pages: for page in &self.pages {
            if self.progress.cap_reached() {
                tracing::debug!("Worker {}: cap reached, stopping", self.index);
                break;
            }

            let items = self.fetch_listing(page).await?;
            if items.is_empty() {
                tracing::debug!("Worker {}: page {} has no items", self.index, page.index());
                continue;
            }
            tracing::debug!(
                "Worker {}: {} items on page {}",
                self.index,
                items.len(),
                page.index()
            );

            for item in &items {
                if self.progress.cap_reached() {
                    tracing::debug!("Worker {}: cap reached, stopping", self.index);
                    break 'pages;
                }

                records.push(self.extract_item(item).await);
                self.progress.record_item();
            }
        }

        tracing::info!("Worker {}: collected {} records", self.index, records.len());
        Ok(records)
    }

    async fn fetch_listing(&self, page: &PageRef) -> Result<Vec<ListingItem>, HarvestError> {
        match self.session.fetch(page.url()).await {
            FetchResult::Success { final_url, body } => Ok(parse_listing(&body, &final_url)),
            failure => {
                let message = failure.failure_reason().unwrap_or_default();
                tracing::error!(
                    "Worker {}: listing page {} failed: {}",
                    self.index,
                    page.url(),
                    message
                );
                Err(HarvestError::Navigation {
                    url: page.url().to_string(),
                    message,
                })
            }
        }
    }

    async fn extract_item(&self, item: &ListingItem) -> ProductRecord {
        let url = item.detail_url.as_str();

        match self.session.fetch(&item.detail_url).await {
            FetchResult::Success { body, .. } => {
                ProductRecord::from_detail(url, Some(parse_detail(&body)))
            }
            failure => {
                tracing::warn!(
                    "Worker {}: detail page {} failed ({}), keeping empty fields",
                    self.index,
                    url,
                    failure.failure_reason().unwrap_or_default()
                );
                ProductRecord::from_detail(url, None)
            }
        }
    }
}
