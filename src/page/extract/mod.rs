//! Field extraction with composable, ordered extractors.
//!
//! Every field of a [`ProductRecord`](crate::page::ProductRecord) is read by
//! an [`ExtractorChain`]: extractors are tried in order and the first one
//! that yields a value wins.

pub mod attribute;
pub mod content;
pub mod image;
pub mod link;
pub mod pattern;

use crate::page::selectors::{self, ID_ATTRS};
use scraper::ElementRef;

pub use attribute::AttributeExtractor;
pub use content::{Match, PriceExtractor, TextExtractor};
pub use image::{ImageExtractor, ImageScope};
pub use link::{HrefExtractor, LinkScope, PageUrlExtractor};
pub use pattern::{DatasetPatternExtractor, LinkPatternExtractor};

/// What an extractor knows about the page besides the node itself.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// URL of the page the node belongs to
    pub url: &'a str,
}

impl<'a> PageContext<'a> {
    pub fn new(url: &'a str) -> Self {
        Self { url }
    }
}

/// Trait for reading one field from a candidate node.
pub trait Extractor: Send + Sync {
    /// Returns the field value, or None to let the next extractor try.
    fn extract(&self, node: ElementRef<'_>, page: &PageContext<'_>) -> Option<String>;

    /// Returns a description of this extractor.
    fn description(&self) -> String;
}

/// An ordered list of extractors for a single field.
pub struct ExtractorChain {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self { extractors: Vec::new() }
    }

    /// Appends an extractor to the chain.
    pub fn add(&mut self, extractor: impl Extractor + 'static) -> &mut Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Returns the first value produced by the chain.
    pub fn first_match(&self, node: ElementRef<'_>, page: &PageContext<'_>) -> Option<String> {
        self.extractors.iter().find_map(|e| e.extract(node, page))
    }

    /// Returns true if no extractors are configured.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Returns the number of extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Returns descriptions of all extractors, in order.
    pub fn descriptions(&self) -> Vec<String> {
        self.extractors.iter().map(|e| e.description()).collect()
    }

    /// Product ID: known data attributes, then any numeric dataset value,
    /// then the node's own link, then the nearest enclosing link.
    pub fn product_id() -> Self {
        let mut chain = Self::new();
        chain
            .add(AttributeExtractor::new(ID_ATTRS))
            .add(DatasetPatternExtractor::new())
            .add(LinkPatternExtractor::new(LinkScope::Own))
            .add(LinkPatternExtractor::new(LinkScope::Closest));
        chain
    }

    /// Cover image: first descendant image, then the node's own source.
    pub fn cover() -> Self {
        let mut chain = Self::new();
        chain
            .add(ImageExtractor::new(ImageScope::Descendant))
            .add(ImageExtractor::new(ImageScope::Own));
        chain
    }

    /// Title: an element with a `title` attribute, a heading, or a
    /// `title`-ish class.
    pub fn title() -> Self {
        let mut chain = Self::new();
        chain
            .add(TextExtractor::new(Match::Selector(&selectors::TITLE_ATTR)))
            .add(TextExtractor::new(Match::Selector(&selectors::HEADING)))
            .add(TextExtractor::new(Match::ClassContains("title")));
        chain
    }

    /// Price: a `price`-ish class, then a `data-price` element.
    pub fn price() -> Self {
        let mut chain = Self::new();
        chain
            .add(PriceExtractor::new(Match::ClassContains("price")))
            .add(PriceExtractor::new(Match::Selector(&selectors::DATA_PRICE)));
        chain
    }

    /// Source URL: own link, nearest enclosing link, then the page URL.
    pub fn source_url() -> Self {
        let mut chain = Self::new();
        chain
            .add(HrefExtractor::new(LinkScope::Own))
            .add(HrefExtractor::new(LinkScope::Closest))
            .add(PageUrlExtractor);
        chain
    }
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Descendants of `node` (excluding the node itself) in document order.
pub(crate) fn descendants<'a>(node: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    node.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// The node itself or its nearest ancestor that is an anchor with an href.
pub(crate) fn closest_anchor(node: ElementRef<'_>) -> Option<ElementRef<'_>> {
    std::iter::once(node)
        .chain(node.ancestors().filter_map(ElementRef::wrap))
        .find(|e| selectors::ANCHOR.matches(e))
}
