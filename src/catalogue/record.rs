//! Product records and the fixed attribute schema

use serde::Serialize;
use std::collections::HashMap;

/// Attributes read from the product information table of a detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeField {
    Upc,
    ProductType,
    PriceExclTax,
    PriceInclTax,
    Tax,
    ReviewCount,
}

impl AttributeField {
    /// Maps a table header label to its field; unknown labels yield `None`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "UPC" => Some(Self::Upc),
            "Product Type" => Some(Self::ProductType),
            "Price (excl. tax)" => Some(Self::PriceExclTax),
            "Price (incl. tax)" => Some(Self::PriceInclTax),
            "Tax" => Some(Self::Tax),
            "Number of reviews" => Some(Self::ReviewCount),
            _ => None,
        }
    }
}

/// Fields extracted from one detail page
///
/// Every field is located independently; `None` means that field could not be
/// found and says nothing about the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub title: Option<String>,
    pub price: Option<String>,
    pub availability: Option<String>,
    pub description: Option<String>,
    pub attributes: HashMap<AttributeField, String>,
}

/// One exported product
///
/// All fields are always present; anything that could not be extracted is an
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub title: String,
    pub price: String,
    pub availability: String,
    pub description: String,
    pub upc: String,
    pub product_type: String,
    pub price_excl_tax: String,
    pub price_incl_tax: String,
    pub tax: String,
    pub num_reviews: String,
    pub url: String,
}

impl ProductRecord {
    /// Column headers of the export artifact, in field order
    pub const COLUMNS: [&'static str; 11] = [
        "title",
        "price",
        "availability",
        "description",
        "upc",
        "product_type",
        "price_excl_tax",
        "price_incl_tax",
        "tax",
        "num_reviews",
        "url",
    ];

    /// Builds a record from extracted fields
    ///
    /// `fields` is `None` when the detail page could not be loaded at all; the
    /// record is still produced and carries only its source URL.
    pub fn from_detail(url: &str, fields: Option<DetailFields>) -> Self {
        let DetailFields {
            title,
            price,
            availability,
            description,
            mut attributes,
        } = fields.unwrap_or_default();

        let mut attribute = |field| attributes.remove(&field).unwrap_or_default();

        Self {
            upc: attribute(AttributeField::Upc),
            product_type: attribute(AttributeField::ProductType),
            price_excl_tax: attribute(AttributeField::PriceExclTax),
            price_incl_tax: attribute(AttributeField::PriceInclTax),
            tax: attribute(AttributeField::Tax),
            num_reviews: attribute(AttributeField::ReviewCount),
            title: title.unwrap_or_default(),
            price: price.unwrap_or_default(),
            availability: availability.unwrap_or_default(),
            description: description.unwrap_or_default(),
            url: url.to_string(),
        }
    }

    /// Field values in `COLUMNS` order
    pub fn values(&self) -> [&str; 11] {
        [
            &self.title,
            &self.price,
            &self.availability,
            &self.description,
            &self.upc,
            &self.product_type,
            &self.price_excl_tax,
            &self.price_incl_tax,
            &self.tax,
            &self.num_reviews,
            &self.url,
        ]
    }
}
