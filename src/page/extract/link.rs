//! Link-based extraction for a card's source URL.

use super::{closest_anchor, Extractor, PageContext};
use crate::page::urls;
use scraper::ElementRef;

/// Which link an extractor looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    /// The node's own `href`
    Own,
    /// The node itself or its nearest ancestor anchor
    Closest,
}

/// Returns a link target resolved against the page URL.
pub struct HrefExtractor {
    scope: LinkScope,
}

impl HrefExtractor {
    pub fn new(scope: LinkScope) -> Self {
        Self { scope }
    }
}

impl Extractor for HrefExtractor {
    fn extract(&self, node: ElementRef<'_>, page: &PageContext<'_>) -> Option<String> {
        let href = match self.scope {
            LinkScope::Own => node.value().attr("href")?,
            LinkScope::Closest => closest_anchor(node)?.value().attr("href")?,
        };

        let resolved = urls::resolve(page.url, href);
        (!resolved.is_empty()).then_some(resolved)
    }

    fn description(&self) -> String {
        match self.scope {
            LinkScope::Own => "Own link".to_string(),
            LinkScope::Closest => "Enclosing link".to_string(),
        }
    }
}

/// Falls back to the URL of the page itself.
pub struct PageUrlExtractor;

impl Extractor for PageUrlExtractor {
    fn extract(&self, _node: ElementRef<'_>, page: &PageContext<'_>) -> Option<String> {
        Some(page.url.to_string())
    }

    fn description(&self) -> String {
        "Page URL".to_string()
    }
}
