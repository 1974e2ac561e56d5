//! Text extraction from descendant elements (title, price).

use super::{descendants, Extractor, PageContext};
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// How a descendant element is located.
#[derive(Clone, Copy)]
pub enum Match {
    /// Elements matching a CSS selector
    Selector(&'static LazyLock<Selector>),
    /// Elements whose class attribute contains the text (case-insensitive)
    ClassContains(&'static str),
}

impl Match {
    fn matches(&self, element: &ElementRef<'_>) -> bool {
        match self {
            Match::Selector(selector) => selector.matches(element),
            Match::ClassContains(needle) => element
                .value()
                .attr("class")
                .is_some_and(|class| class.to_lowercase().contains(needle)),
        }
    }

    /// First descendant of `node` that matches.
    fn first<'a>(&self, node: ElementRef<'a>) -> Option<ElementRef<'a>> {
        descendants(node).find(|e| self.matches(e))
    }

    fn describe(&self) -> String {
        match self {
            Match::Selector(_) => "selector".to_string(),
            Match::ClassContains(needle) => format!("class contains '{}'", needle),
        }
    }
}

/// Trimmed text of the first matching descendant.
///
/// A matching element with no text still ends the search with an empty
/// string; only a missing element lets the next extractor run.
pub struct TextExtractor {
    target: Match,
}

impl TextExtractor {
    pub fn new(target: Match) -> Self {
        Self { target }
    }
}

impl Extractor for TextExtractor {
    fn extract(&self, node: ElementRef<'_>, _page: &PageContext<'_>) -> Option<String> {
        let element = self.target.first(node)?;
        Some(element.text().collect::<String>().trim().to_string())
    }

    fn description(&self) -> String {
        format!("Text of {}", self.target.describe())
    }
}

/// Price text of the first matching descendant, reduced to digits, `.` and `,`.
///
/// Falls back to the element's `data-price` attribute when it has no text.
pub struct PriceExtractor {
    target: Match,
}

impl PriceExtractor {
    pub fn new(target: Match) -> Self {
        Self { target }
    }
}

impl Extractor for PriceExtractor {
    fn extract(&self, node: ElementRef<'_>, _page: &PageContext<'_>) -> Option<String> {
        let element = self.target.first(node)?;

        let text = element.text().collect::<String>();
        let raw = if text.trim().is_empty() {
            element.value().attr("data-price").unwrap_or_default().to_string()
        } else {
            text
        };

        Some(clean_price(&raw))
    }

    fn description(&self) -> String {
        format!("Price of {}", self.target.describe())
    }
}

/// Keeps only ASCII digits, `.` and `,`.
pub fn clean_price(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',').collect()
}
