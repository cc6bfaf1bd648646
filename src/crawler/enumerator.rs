//! Listing page enumeration

use crate::catalogue::PageRef;
use crate::config::SourceConfig;
use crate::crawler::parser::parse_page_count;
use crate::crawler::session::{FetchResult, Session};
use crate::HarvestError;
use url::Url;

/// Discovers the ordered listing pages of the catalogue
///
/// Fetches the root page and reads the page count from its pagination
/// indicator. A root page without an indicator has a single listing page.
/// Only the first `limit` pages are returned; the indicator is not trusted to
/// be small.
///
/// # Errors
///
/// * `HarvestError::SourceUnreachable` - the root page could not be loaded
pub async fn enumerate_pages(
    session: &Session,
    source: &SourceConfig,
    limit: usize,
) -> Result<Vec<PageRef>, HarvestError> {
    let root = Url::parse(&source.root_url)?;

    let body = match session.fetch(&root).await {
        FetchResult::Success { body, .. } => body,
        failure => {
            let message = failure.failure_reason().unwrap_or_default();
            return Err(HarvestError::SourceUnreachable {
                url: root.to_string(),
                message,
            });
        }
    };

    let page_count = parse_page_count(&body).unwrap_or_else(|| {
        tracing::info!("No pagination indicator on {}, assuming a single page", root);
        1
    });
    tracing::info!("Catalogue has {} listing pages", page_count);

    page_refs(&root, &source.page_path_template, page_count.min(limit))
}

/// Builds `PageRef`s for pages `1..=count` from the path template
pub fn page_refs(root: &Url, template: &str, count: usize) -> Result<Vec<PageRef>, HarvestError> {
    (1..=count)
        .map(|index| -> Result<PageRef, HarvestError> {
            let path = template.replace("{page}", &index.to_string());
            Ok(PageRef::new(index, root.join(&path)?))
        })
        .collect()
}
