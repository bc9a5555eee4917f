//! HTML document queries
//!
//! The catalog markup is addressed by (tag, class) pairs, e.g.
//! `h3.big-artist-list-title` or `img.js-gallery-image`. This module wraps
//! `scraper` with exactly those lookups:
//! - find all elements matching a tag and class
//! - find the first such element
//! - attribute and text access, plus a nested lookup by tag

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document
pub struct Document {
    html: Html,
}

/// An element inside a [`Document`]
#[derive(Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl Document {
    /// Parses HTML content into a queryable document
    ///
    /// Parsing is lenient: malformed markup still produces a document, in the
    /// worst case one in which no query matches.
    ///
    /// # Example
    ///
    /// ```
    /// use cvrs_scraper::crawler::Document;
    ///
    /// let doc = Document::parse(r#"<a class="image-list-item" href="/x">x</a>"#);
    /// let item = doc.find_first("a", "image-list-item").unwrap();
    /// assert_eq!(item.attr("href"), Some("/x"));
    /// ```
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Returns every element with the given tag name carrying the given class,
    /// in document order
    pub fn find_all(&self, tag: &str, class: &str) -> Vec<Element<'_>> {
        match class_selector(tag, class) {
            Some(selector) => self
                .html
                .select(&selector)
                .map(|inner| Element { inner })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the first element with the given tag name and class
    pub fn find_first(&self, tag: &str, class: &str) -> Option<Element<'_>> {
        let selector = class_selector(tag, class)?;
        self.html
            .select(&selector)
            .next()
            .map(|inner| Element { inner })
    }
}

impl<'a> Element<'a> {
    /// Looks up an attribute value
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    /// Concatenated text content, trimmed
    pub fn text(&self) -> String {
        self.inner.text().collect::<String>().trim().to_string()
    }

    /// First descendant element with the given tag name
    pub fn find(&self, tag: &str) -> Option<Element<'a>> {
        let selector = Selector::parse(tag).ok()?;
        self.inner
            .select(&selector)
            .next()
            .map(|inner| Element { inner })
    }
}

/// Builds a `tag.class` selector; `None` when either part is not a valid
/// CSS identifier
fn class_selector(tag: &str, class: &str) -> Option<Selector> {
    match Selector::parse(&format!("{}.{}", tag, class)) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Invalid selector {}.{}: {:?}", tag, class, e);
            None
        }
    }
}
