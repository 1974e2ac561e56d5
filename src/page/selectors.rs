//! CSS selectors and patterns for locating product cards.
//!
//! This file contains every heuristic the collector relies on.
//! Update this file when the target site changes its markup, and add a
//! fixture that reproduces the new structure.

use regex_lite::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// Attributes whose presence marks an element as a candidate card.
pub const CANDIDATE_ATTRS: &[&str] = &["data-id", "data-note-id", "data-item-id"];

/// Keywords that mark an anchor as a candidate when its href contains them
/// (case-insensitive).
pub const CANDIDATE_LINK_KEYWORDS: &[&str] = &["goods", "product"];

/// Attributes tried in order when reading a product ID.
pub const ID_ATTRS: &[&str] = &["data-item-id", "data-id", "data-note-id", "data-spu-id"];

/// Returns true if the element matches any candidate heuristic.
pub fn is_candidate(element: ElementRef) -> bool {
    let value = element.value();

    if CANDIDATE_ATTRS.iter().any(|attr| value.attr(attr).is_some()) {
        return true;
    }

    if value.name() != "a" {
        return false;
    }

    value.attr("href").is_some_and(|href| {
        let href = href.to_lowercase();
        CANDIDATE_LINK_KEYWORDS.iter().any(|kw| href.contains(kw))
    })
}

/// Images with a source.
pub static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());

/// Anchors with a link target.
pub static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Elements carrying a `title` attribute.
pub static TITLE_ATTR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("[title]").unwrap());

/// Heading elements.
pub static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5").unwrap());

/// Elements carrying a `data-price` attribute.
pub static DATA_PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-price]").unwrap());

/// Product/item/goods link followed by a 6+ digit ID (capture group 2).
pub static PRODUCT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(product|item|goods)[^\d]*(\d{6,})").unwrap());

/// Six or more consecutive digits.
pub static LONG_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{6,}").unwrap());

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_element<'a>(html: &'a Html, selector: &str) -> ElementRef<'a> {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector).next().unwrap()
    }

    #[test]
    fn test_selectors_compile() {
        let _ = &*IMAGE;
        let _ = &*ANCHOR;
        let _ = &*TITLE_ATTR;
        let _ = &*HEADING;
        let _ = &*DATA_PRICE;
        let _ = &*PRODUCT_LINK;
        let _ = &*LONG_DIGITS;
    }

    #[test]
    fn test_candidate_by_attribute() {
        let html = Html::parse_fragment(r#"<div data-note-id=""></div><span class="x"></span>"#);
        assert!(is_candidate(first_element(&html, "div")));
        assert!(!is_candidate(first_element(&html, "span")));
    }

    #[test]
    fn test_candidate_by_link_case_insensitive() {
        let html = Html::parse_fragment(
            r#"<a id="a" href="/Goods-Detail/123"></a>
               <a id="b" href="/PRODUCT/1"></a>
               <a id="c" href="/user/profile"></a>
               <div id="d" href="/goods/1"></div>"#,
        );
        assert!(is_candidate(first_element(&html, "#a")));
        assert!(is_candidate(first_element(&html, "#b")));
        assert!(!is_candidate(first_element(&html, "#c")));
        // only anchors qualify through their href
        assert!(!is_candidate(first_element(&html, "#d")));
    }

    #[test]
    fn test_product_link_pattern() {
        let caps = PRODUCT_LINK.captures("https://www.example.com/Goods-detail?id=1234567").unwrap();
        assert_eq!(&caps[2], "1234567");

        let caps = PRODUCT_LINK.captures("/item/98765432").unwrap();
        assert_eq!(&caps[2], "98765432");

        assert!(PRODUCT_LINK.captures("/goods/12345").is_none());
        assert!(PRODUCT_LINK.captures("/user/12345678").is_none());
    }

    #[test]
    fn test_long_digits() {
        assert!(LONG_DIGITS.is_match("note-1234567"));
        assert!(!LONG_DIGITS.is_match("12345"));
    }
}
