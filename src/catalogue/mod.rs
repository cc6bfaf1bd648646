//! Catalogue data model
//!
//! # Components
//!
//! - `PageRef`: an enumerated listing page (1-based index and resolved URL)
//! - `ListingItem`: a link to one product detail page found on a listing page
//! - `ProductRecord`: the exported unit, one per detail page

mod page;
mod record;

pub use page::{ListingItem, PageRef};
pub use record::{AttributeField, DetailFields, ProductRecord};
