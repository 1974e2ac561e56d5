//! Data models for scraped product cards.

use serde::{Deserialize, Serialize};

/// One product card scraped from a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Product identifier, unique within one collection pass
    pub product_id: String,
    /// Cover image URL without its query string
    pub cover: String,
    /// Card title, empty if none was found
    #[serde(default)]
    pub title: String,
    /// Price text reduced to digits, `.` and `,`; empty if none was found
    #[serde(default)]
    pub price: String,
    /// Card link, falling back to the page URL
    #[serde(default)]
    pub source_url: String,
}

impl ProductRecord {
    /// Creates a record with only the required fields set.
    pub fn new(product_id: impl Into<String>, cover: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            cover: cover.into(),
            title: String::new(),
            price: String::new(),
            source_url: String::new(),
        }
    }
}

/// Most recent collection result held for the lifetime of a scraper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCache {
    pub records: Vec<ProductRecord>,
    /// Epoch milliseconds of the last successful collection, 0 if never
    pub last_updated: u64,
}

impl CollectionCache {
    /// Returns true if nothing has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
