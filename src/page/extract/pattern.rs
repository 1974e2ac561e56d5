//! Regex-based extraction over data attributes and links.

use super::link::LinkScope;
use super::{closest_anchor, Extractor, PageContext};
use crate::page::selectors::{LONG_DIGITS, PRODUCT_LINK};
use crate::page::urls;
use scraper::ElementRef;

/// Returns the first `data-*` attribute value containing 6+ digits.
pub struct DatasetPatternExtractor;

impl DatasetPatternExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DatasetPatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for DatasetPatternExtractor {
    fn extract(&self, node: ElementRef<'_>, _page: &PageContext<'_>) -> Option<String> {
        node.value()
            .attrs()
            .filter(|(name, _)| name.starts_with("data-"))
            .map(|(_, value)| value)
            .find(|value| LONG_DIGITS.is_match(value))
            .map(String::from)
    }

    fn description(&self) -> String {
        "Dataset value with 6+ digits".to_string()
    }
}

/// Pulls the numeric ID out of a product/item/goods link.
pub struct LinkPatternExtractor {
    scope: LinkScope,
}

impl LinkPatternExtractor {
    pub fn new(scope: LinkScope) -> Self {
        Self { scope }
    }
}

impl Extractor for LinkPatternExtractor {
    fn extract(&self, node: ElementRef<'_>, page: &PageContext<'_>) -> Option<String> {
        let href = match self.scope {
            LinkScope::Own => node.value().attr("href")?,
            LinkScope::Closest => closest_anchor(node)?.value().attr("href")?,
        };

        let href = urls::resolve(page.url, href);
        let caps = PRODUCT_LINK.captures(&href)?;
        caps.get(2).map(|m| m.as_str().to_string())
    }

    fn description(&self) -> String {
        match self.scope {
            LinkScope::Own => "Product ID in own link".to_string(),
            LinkScope::Closest => "Product ID in enclosing link".to_string(),
        }
    }
}
