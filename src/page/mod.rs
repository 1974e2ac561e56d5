//! Page scraping: locating product cards in a DOM snapshot.

pub mod collector;
pub mod extract;
pub mod models;
pub mod selectors;
pub mod source;
pub mod urls;

pub use collector::{Collector, PageScraper};
pub use models::{CollectionCache, ProductRecord};
pub use source::{FilePage, HttpPage, PageSnapshot, PageSource};
