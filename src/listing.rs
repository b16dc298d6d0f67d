//! Indentation heuristics for the two flat listings the site renders.
//!
//! The package listing indents rows with `padding-left: Npx` on each
//! `td.pkg-name`; the package navigation indents `#manual-nav dd` rows with
//! pairs of non-breaking spaces.

use crate::document::{clean_title, select_within, text_of, HtmlDocument};
use crate::error::{MirrorError, Result};
use regex::Regex;
use std::sync::LazyLock;

static PADDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"padding-left:\s*(\d+)px").unwrap());

const NBSP: char = '\u{a0}';
const NBSP_ENTITY: &str = "&nbsp;";

/// One row of an indented listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Cleaned link text.
    pub label: String,
    /// Raw `href` of the row's link.
    pub href: String,
    pub level: usize,
}

/// Level encoded in a `padding-left` style, in units of `unit` pixels.
pub fn padding_level(style: &str, unit: usize) -> Result<usize> {
    let caps = PADDING
        .captures(style)
        .ok_or_else(|| MirrorError::Format(format!("cannot find padding in style '{style}'")))?;
    let pixels: usize = caps[1]
        .parse()
        .map_err(|e| MirrorError::Format(format!("bad padding '{}': {e}", &caps[1])))?;
    Ok(pixels / unit.max(1))
}

/// Level encoded as leading non-breaking spaces, two per level.
///
/// Both the character and its entity spelling are counted; ASCII whitespace
/// between them is ignored.
pub fn nbsp_level(text: &str) -> usize {
    let mut rest = text;
    let mut count = 0;
    loop {
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
        if let Some(r) = trimmed.strip_prefix(NBSP) {
            rest = r;
        } else if let Some(r) = trimmed.strip_prefix(NBSP_ENTITY) {
            rest = r;
        } else {
            break;
        }
        count += 1;
    }
    count / 2
}

/// Rows of the package listing (`td.pkg-name`).
pub fn package_rows(doc: &HtmlDocument, unit: usize) -> Result<Vec<ListingRow>> {
    doc.select("td.pkg-name")?
        .into_iter()
        .map(|cell| {
            let style = cell
                .value()
                .attr("style")
                .ok_or_else(|| MirrorError::Format("style attribute not found".to_owned()))?;
            let level = padding_level(style, unit)?;
            let (label, href) = row_link(cell)?;
            Ok(ListingRow { label, href, level })
        })
        .collect()
}

/// Rows of a package's navigation index (`#manual-nav dd`).
pub fn nav_rows(doc: &HtmlDocument) -> Result<Vec<ListingRow>> {
    doc.select("#manual-nav dd")?
        .into_iter()
        .map(|dd| {
            let level = nbsp_level(&text_of(dd));
            let (label, href) = row_link(dd)?;
            Ok(ListingRow { label, href, level })
        })
        .collect()
}

fn row_link(cell: scraper::ElementRef<'_>) -> Result<(String, String)> {
    let link = select_within(cell, "a")?
        .into_iter()
        .next()
        .ok_or_else(|| MirrorError::Format(format!("no link in row '{}'", text_of(cell).trim())))?;
    let href = link
        .value()
        .attr("href")
        .ok_or_else(|| MirrorError::Format("href not found".to_owned()))?;
    Ok((clean_title(&text_of(link)), href.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_level() {
        assert_eq!(padding_level("padding-left: 0px;", 20).unwrap(), 0);
        assert_eq!(padding_level("padding-left:40px", 20).unwrap(), 2);
        assert_eq!(padding_level("color: red; padding-left: 30px", 20).unwrap(), 1);
        assert!(matches!(
            padding_level("margin: 0", 20),
            Err(MirrorError::Format(_))
        ));
    }

    #[test]
    fn test_nbsp_level() {
        assert_eq!(nbsp_level("Index"), 0);
        assert_eq!(nbsp_level("\u{a0}\u{a0}func F"), 1);
        assert_eq!(nbsp_level("\u{a0} \u{a0}\n\u{a0}\u{a0} x"), 2);
        assert_eq!(nbsp_level("&nbsp;&nbsp;x"), 1);
        // a single space is not a level
        assert_eq!(nbsp_level("\u{a0}x"), 0);
        // spaces after the prefix do not count
        assert_eq!(nbsp_level("\u{a0}\u{a0}a\u{a0}\u{a0}"), 1);
    }

    #[test]
    fn test_package_rows() {
        let doc = HtmlDocument::parse(
            r#"<table>
            <tr><td class="pkg-name" style="padding-left: 0px;"><a href="archive/">archive</a></td></tr>
            <tr><td class="pkg-name" style="padding-left: 20px;"><a href="archive/tar/">tar</a></td></tr>
            </table>"#,
        );
        let rows = package_rows(&doc, 20).unwrap();
        assert_eq!(
            rows,
            [
                ListingRow {
                    label: "archive".into(),
                    href: "archive/".into(),
                    level: 0
                },
                ListingRow {
                    label: "tar".into(),
                    href: "archive/tar/".into(),
                    level: 1
                },
            ]
        );
    }

    #[test]
    fn test_package_row_without_style_fails() {
        let doc = HtmlDocument::parse(
            r#"<table><tr><td class="pkg-name"><a href="x/">x</a></td></tr></table>"#,
        );
        assert!(matches!(package_rows(&doc, 20), Err(MirrorError::Format(_))));
    }

    #[test]
    fn test_nav_rows() {
        let doc = HtmlDocument::parse(
            r##"<div id="manual-nav"><dl>
            <dd><a href="#pkg-constants">Constants</a></dd>
            <dd><a href="#Header">type Header</a></dd>
            <dd>&nbsp; &nbsp; <a href="#Header.FileInfo">func (h *Header) FileInfo()   os.FileInfo</a></dd>
            </dl></div>"##,
        );
        let rows = nav_rows(&doc).unwrap();
        let levels: Vec<usize> = rows.iter().map(|r| r.level).collect();
        assert_eq!(levels, [0, 0, 1]);
        assert_eq!(rows[2].label, "func (h *Header) FileInfo() os.FileInfo");
        assert_eq!(rows[2].href, "#Header.FileInfo");
    }

    #[test]
    fn test_nav_row_without_href_fails() {
        let doc = HtmlDocument::parse(r#"<div id="manual-nav"><dl><dd><a>x</a></dd></dl></div>"#);
        assert!(nav_rows(&doc).is_err());
    }
}
