//! Attribute-based extraction.

use super::{Extractor, PageContext};
use scraper::ElementRef;

/// Reads the first non-empty attribute from a fixed list, trimmed.
pub struct AttributeExtractor {
    names: Vec<&'static str>,
}

impl AttributeExtractor {
    /// Creates an extractor trying `names` in order.
    pub fn new(names: &[&'static str]) -> Self {
        Self { names: names.to_vec() }
    }
}

impl Extractor for AttributeExtractor {
    fn extract(&self, node: ElementRef<'_>, _page: &PageContext<'_>) -> Option<String> {
        self.names
            .iter()
            .filter_map(|name| node.value().attr(name))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(String::from)
    }

    fn description(&self) -> String {
        format!("Attribute: {}", self.names.join(", "))
    }
}
