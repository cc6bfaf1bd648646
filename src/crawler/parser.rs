//! HTML extraction for catalogue pages
//!
//! This module handles parsing the three page kinds of the catalogue:
//! - The root page, for the pagination indicator
//! - Listing pages, for product detail links
//! - Detail pages, for product fields
//!
//! Every detail field is located on its own; a selector that matches nothing
//! leaves that one field as `None`.

use crate::catalogue::{AttributeField, DetailFields, ListingItem};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Reads the number of listing pages from the pagination indicator
///
/// The indicator reads like `Page 1 of 50`; its last token is the page count.
/// Returns `None` when the page has no readable indicator.
pub fn parse_page_count(html: &str) -> Option<usize> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(".current").ok()?;

    let text = document.select(&selector).next().map(element_text)?;
    text.split_whitespace()
        .last()
        .and_then(|last| last.parse::<usize>().ok())
        .filter(|count| *count > 0)
}

/// Extracts product detail links from a listing page, in page order
///
/// `page_url` is the listing page's own URL; relative links resolve against it.
pub fn parse_listing(html: &str, page_url: &Url) -> Vec<ListingItem> {
    let document = Html::parse_document(html);
    let (Ok(item_selector), Ok(link_selector)) = (
        Selector::parse("article.product_pod"),
        Selector::parse(".image_container a[href]"),
    ) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for article in document.select(&item_selector) {
        let href = article
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"));

        match href.and_then(|href| page_url.join(href.trim()).ok()) {
            Some(detail_url) => items.push(ListingItem { detail_url }),
            None => tracing::debug!("Skipping product without detail link on {}", page_url),
        }
    }

    items
}

/// Extracts product fields from a detail page
pub fn parse_detail(html: &str) -> DetailFields {
    let document = Html::parse_document(html);

    DetailFields {
        title: select_text(&document, "h1"),
        price: select_text(&document, ".price_color"),
        availability: select_text(&document, ".availability"),
        description: select_text(&document, "#product_description ~ p"),
        attributes: extract_attributes(&document).into_iter().collect(),
    }
}

/// Text of the first element matching `selector`
fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(element_text)
}

/// Rows of the product information table whose label is a known attribute
fn extract_attributes(document: &Html) -> Vec<(AttributeField, String)> {
    let (Ok(row_selector), Ok(th), Ok(td)) = (
        Selector::parse("table.table.table-striped tr"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    document
        .select(&row_selector)
        .filter_map(|row| {
            let label = row.select(&th).next().map(element_text)?;
            let field = AttributeField::from_label(&label)?;
            let value = row.select(&td).next().map(element_text).unwrap_or_default();
            Some((field, value))
        })
        .collect()
}

/// Visible text of an element with layout whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
