//! Product card collection over a DOM snapshot.

use crate::clock::now_millis;
use crate::error::Result;
use crate::page::extract::{ExtractorChain, PageContext};
use crate::page::models::{CollectionCache, ProductRecord};
use crate::page::selectors::is_candidate;
use crate::page::source::PageSource;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, trace};

/// Turns candidate nodes into product records.
pub struct Collector {
    product_id: ExtractorChain,
    cover: ExtractorChain,
    title: ExtractorChain,
    price: ExtractorChain,
    source_url: ExtractorChain,
}

impl Collector {
    /// Creates a collector with the standard extractor chains.
    pub fn new() -> Self {
        Self {
            product_id: ExtractorChain::product_id(),
            cover: ExtractorChain::cover(),
            title: ExtractorChain::title(),
            price: ExtractorChain::price(),
            source_url: ExtractorChain::source_url(),
        }
    }

    /// Collects unique product records from an HTML document.
    ///
    /// Candidates are visited in document order; the first record seen for
    /// a product ID wins.
    pub fn collect_from_html(&self, html: &str, page_url: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let page = PageContext::new(page_url);

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut candidates = 0usize;

        let nodes = document.root_element().descendants().filter_map(ElementRef::wrap);
        for node in nodes.filter(|n| is_candidate(*n)) {
            candidates += 1;

            let Some(record) = self.pick(node, &page) else {
                trace!("Skipping <{}>: no product ID or cover", node.value().name());
                continue;
            };

            if !seen.insert(record.product_id.clone()) {
                trace!("Skipping duplicate product {}", record.product_id);
                continue;
            }

            records.push(record);
        }

        debug!("Collected {} products from {} candidate nodes", records.len(), candidates);
        records
    }

    /// Extracts a record from one node; None if it is not a product card.
    fn pick(&self, node: ElementRef<'_>, page: &PageContext<'_>) -> Option<ProductRecord> {
        let product_id = self.product_id.first_match(node, page)?;
        let cover = self.cover.first_match(node, page)?;

        Some(ProductRecord {
            product_id,
            cover,
            title: self.title.first_match(node, page).unwrap_or_default(),
            price: self.price.first_match(node, page).unwrap_or_default(),
            source_url: self.source_url.first_match(node, page).unwrap_or_default(),
        })
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects products from a page source and remembers the last result.
pub struct PageScraper {
    source: Arc<dyn PageSource>,
    collector: Collector,
    cache: Mutex<CollectionCache>,
}

impl PageScraper {
    /// Creates a scraper bound to a page source with an empty cache.
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self { source, collector: Collector::new(), cache: Mutex::new(CollectionCache::default()) }
    }

    /// Scans the current page and replaces the cache with the result.
    pub async fn collect(&self) -> Result<Vec<ProductRecord>> {
        let snapshot = self.source.snapshot().await?;

        let records = self.collector.collect_from_html(&snapshot.html, &snapshot.url);
        info!("Collected {} products from {}", records.len(), snapshot.url);

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.records = records.clone();
        cache.last_updated = now_millis();

        Ok(records)
    }

    /// Returns the last collection result without touching the page.
    pub fn read_cache(&self) -> CollectionCache {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// URL of the page this scraper reads.
    pub fn page_url(&self) -> &str {
        self.source.url()
    }
}
