//! Static work partitioning
//!
//! A job only crawls the page prefix its cap can need, and deals those pages
//! to workers round-robin: worker `i` gets pages `i, i+W, i+2W, ...`.

use crate::catalogue::PageRef;

/// Pages selected for a job and their assignment to workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPlan {
    /// Number of pages the cap needs at the configured items-per-page
    pub needed_pages: usize,

    /// Page list of each worker, indexed by worker
    pub assignments: Vec<Vec<PageRef>>,
}

impl WorkPlan {
    pub fn worker_count(&self) -> usize {
        self.assignments.len()
    }

    /// Number of pages actually assigned (bounded by the enumerated pages)
    pub fn page_count(&self) -> usize {
        self.assignments.iter().map(Vec::len).sum()
    }
}

/// `ceil(cap / items_per_page)`
pub fn needed_pages(cap: usize, items_per_page: usize) -> usize {
    cap.div_ceil(items_per_page.max(1))
}

/// Worker count for a job: `min(max_workers, parallelism, pages)`
pub fn worker_count(max_workers: usize, parallelism: usize, pages: usize) -> usize {
    max_workers.min(parallelism).min(pages)
}

/// Parallelism available to this process, at least 1
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Selects the page prefix for `cap` and interleaves it across workers
pub fn partition(
    pages: &[PageRef],
    cap: usize,
    items_per_page: usize,
    max_workers: usize,
    parallelism: usize,
) -> WorkPlan {
    let needed = needed_pages(cap, items_per_page);
    let selected = &pages[..needed.min(pages.len())];
    let workers = worker_count(max_workers, parallelism, selected.len());

    let assignments = (0..workers)
        .map(|worker| {
            selected
                .iter()
                .skip(worker)
                .step_by(workers)
                .cloned()
                .collect()
        })
        .collect();

    WorkPlan {
        needed_pages: needed,
        assignments,
    }
}
