use url::Url;

/// A listing page of the catalogue
///
/// Pages are numbered from 1 in catalogue order and never change once
/// enumerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    index: usize,
    url: Url,
}

impl PageRef {
    pub fn new(index: usize, url: Url) -> Self {
        Self { index, url }
    }

    /// 1-based position of the page in the catalogue
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// A product link discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Absolute URL of the product detail page
    pub detail_url: Url,
}
