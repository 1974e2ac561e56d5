//! Cover image extraction.

use super::{descendants, Extractor, PageContext};
use crate::page::selectors::IMAGE;
use crate::page::urls;
use scraper::ElementRef;

/// Where to look for the image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageScope {
    /// First `img[src]` below the node
    Descendant,
    /// The node's own `src` (the node is itself an image)
    Own,
}

/// Returns an absolute image URL with its query string removed.
pub struct ImageExtractor {
    scope: ImageScope,
}

impl ImageExtractor {
    pub fn new(scope: ImageScope) -> Self {
        Self { scope }
    }
}

impl Extractor for ImageExtractor {
    fn extract(&self, node: ElementRef<'_>, page: &PageContext<'_>) -> Option<String> {
        let src = match self.scope {
            ImageScope::Descendant => {
                descendants(node).find(|e| IMAGE.matches(e))?.value().attr("src")?
            }
            ImageScope::Own => node.value().attr("src")?,
        };

        let resolved = urls::resolve(page.url, src);
        let cover = urls::strip_query(&resolved);
        (!cover.is_empty()).then(|| cover.to_string())
    }

    fn description(&self) -> String {
        match self.scope {
            ImageScope::Descendant => "Descendant image".to_string(),
            ImageScope::Own => "Own image source".to_string(),
        }
    }
}
