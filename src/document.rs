//! Read-only view over a fetched HTML page.
//!
//! Pages are parsed once with `scraper` and queried with CSS selectors.
//! The parsed tree is not `Send`, so callers extract what they need into
//! owned values before awaiting the next download.

use crate::error::{MirrorError, Result};
use scraper::{ElementRef, Html, Selector};

/// Parse a CSS selector, mapping failures to a format error.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| MirrorError::Format(format!("invalid selector '{selector}': {e:?}")))
}

/// Collapse runs of whitespace into single spaces and trim.
///
/// Only ASCII whitespace is collapsed; non-breaking spaces are kept because
/// the navigation heuristics count them.
pub fn clean_title(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text content of an element.
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Elements under `element` matching `selector`.
pub fn select_within<'a>(element: ElementRef<'a>, selector: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = parse_selector(selector)?;
    Ok(element.select(&selector).collect())
}

/// The next sibling that is an element.
pub fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// All following sibling elements in document order.
pub fn following_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}

/// A parsed HTML page.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parse a complete document.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).collect())
    }

    /// First element matching `selector`.
    pub fn select_first(&self, selector: &str) -> Result<Option<ElementRef<'_>>> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).next())
    }

    /// Element with the given `id` attribute.
    pub fn element_by_id(&self, tag: &str, id: &str) -> Result<Option<ElementRef<'_>>> {
        let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
        self.select_first(&format!(r#"{tag}[id="{escaped}"]"#))
    }

    /// Cleaned text of the `<title>` element, empty when there is none.
    pub fn title(&self) -> Result<String> {
        Ok(self
            .select_first("title")?
            .map(|t| clean_title(&text_of(t)))
            .unwrap_or_default())
    }

    /// Whether the page is a directory listing rather than a package.
    pub fn is_directory(&self) -> Result<bool> {
        Ok(self
            .select("#page h1")?
            .into_iter()
            .any(|h1| text_of(h1).trim().starts_with("Directory /")))
    }

    /// Raw references to the page's stylesheets, scripts and images.
    pub fn asset_refs(&self) -> Result<Vec<String>> {
        let mut refs = Vec::new();
        for (selector, attr) in [
            ("link[rel='stylesheet']", "href"),
            ("script", "src"),
            ("img", "src"),
        ] {
            for element in self.select(selector)? {
                if let Some(value) = element.value().attr(attr).filter(|v| !v.is_empty()) {
                    refs.push(value.to_owned());
                }
            }
        }
        Ok(refs)
    }
}
