//! Rewriting fetched pages for offline use.
//!
//! The parsed document is read-only, so rewriting works on the raw markup:
//! only the `href`/`src` values of the affected tags change and everything
//! else is written back byte for byte.

use crate::error::{MirrorError, Result};
use crate::paths::{is_root_relative, rebase, with_index_suffix};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use url::Url;

/// Site-root-relative location of the extra stylesheet.
pub const STYLESHEET_HREF: &str = "/custom.css";

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(a|link|script|img)\b[^>]*>").unwrap());

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\s)(href|src|rel)(\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static HEAD_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

/// Append a link to the extra stylesheet at the end of `<head>`.
///
/// Pages without a `</head>` are returned unchanged.
pub fn inject_stylesheet(markup: &str) -> String {
    let link = format!(r#"<link rel="stylesheet" href="{STYLESHEET_HREF}">"#);
    match HEAD_END.find(markup) {
        Some(m) => {
            let mut out = String::with_capacity(markup.len() + link.len());
            out.push_str(&markup[..m.start()]);
            out.push_str(&link);
            out.push_str(&markup[m.start()..]);
            out
        }
        None => markup.to_owned(),
    }
}

/// Attribute rewritten for `tag`, if any.
fn rewritten_attr(tag: &str, markup: &str) -> Option<&'static str> {
    match tag.to_ascii_lowercase().as_str() {
        "a" => Some("href"),
        "link" => {
            let is_stylesheet = ATTR.captures_iter(markup).any(|c| {
                c[2].eq_ignore_ascii_case("rel")
                    && attr_value(&c).eq_ignore_ascii_case("stylesheet")
            });
            is_stylesheet.then_some("href")
        }
        "script" | "img" => Some("src"),
        _ => None,
    }
}

fn attr_value<'h>(caps: &Captures<'h>) -> &'h str {
    caps.get(4)
        .or_else(|| caps.get(5))
        .map_or("", |m| m.as_str())
}

/// Offline form of one link value found on the page at `base_path`.
fn rewrite_value(base_path: &str, value: &str) -> String {
    if is_root_relative(value) {
        rebase(base_path, value)
    } else {
        with_index_suffix(value)
    }
}

/// Rewrite links on the page at `page_url`.
///
/// `a[href]`, `link[rel=stylesheet][href]`, `script[src]` and `img[src]`
/// values that are root-relative become relative to the page; all other
/// non-empty values only get the directory suffix.
pub fn rewrite_links(page_url: &str, markup: &str) -> Result<String> {
    let base = Url::parse(page_url).map_err(|e| MirrorError::path(page_url, e))?;
    let base_path = base.path();

    let out = TAG.replace_all(markup, |tag: &Captures<'_>| {
        let whole = &tag[0];
        let Some(wanted) = rewritten_attr(&tag[1], whole) else {
            return whole.to_owned();
        };
        ATTR.replace_all(whole, |attr: &Captures<'_>| {
            let value = attr_value(attr);
            if !attr[2].eq_ignore_ascii_case(wanted) || value.is_empty() {
                return attr[0].to_owned();
            }
            let quote = if attr.get(4).is_some() { '"' } else { '\'' };
            format!(
                "{}{}{}{quote}{}{quote}",
                &attr[1],
                &attr[2],
                &attr[3],
                rewrite_value(base_path, value)
            )
        })
        .into_owned()
    });

    Ok(out.into_owned())
}

/// Prepare a fetched page for the offline tree.
pub fn clean_page(page_url: &str, markup: &str) -> Result<String> {
    rewrite_links(page_url, &inject_stylesheet(markup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_stylesheet() {
        let out = inject_stylesheet("<html><HEAD><title>x</title></HEAD><body></body></html>");
        assert_eq!(
            out,
            r#"<html><HEAD><title>x</title><link rel="stylesheet" href="/custom.css"></HEAD><body></body></html>"#
        );
        assert_eq!(inject_stylesheet("<p>no head</p>"), "<p>no head</p>");
    }

    #[test]
    fn test_rewrite_root_relative_links() {
        let page = "http://h/pkg/archive/tar/";
        let markup = r#"<a href="/pkg/io/">io</a><a href='/src/archive/tar/common.go'>c</a>"#;
        assert_eq!(
            rewrite_links(page, markup).unwrap(),
            r#"<a href="../../io/index.html">io</a><a href='../../../src/archive/tar/common.go'>c</a>"#
        );
    }

    #[test]
    fn test_rewrite_other_links_get_index_suffix() {
        let page = "http://h/pkg/";
        let markup = r##"<a href="archive/">a</a><a href="#Header">h</a><a href="http://x/">x</a><a href="">e</a>"##;
        assert_eq!(
            rewrite_links(page, markup).unwrap(),
            r##"<a href="archive/index.html">a</a><a href="#Header">h</a><a href="http://x/index.html">x</a><a href="">e</a>"##
        );
    }

    #[test]
    fn test_rewrite_assets() {
        let page = "http://h/pkg/io/";
        let markup = r#"<link rel="stylesheet" href="/lib/style.css"><link rel="icon" href="/favicon.ico"><script src="/lib/x.js"></script><img class="g" src="/doc/g.png">"#;
        assert_eq!(
            rewrite_links(page, markup).unwrap(),
            r#"<link rel="stylesheet" href="../../lib/style.css"><link rel="icon" href="/favicon.ico"><script src="../../lib/x.js"></script><img class="g" src="../../doc/g.png">"#
        );
    }

    #[test]
    fn test_other_attributes_untouched() {
        let page = "http://h/pkg/io/";
        let markup = r#"<img src="/a.png" data-src="/b.png"><div href="/c/">"#;
        assert_eq!(
            rewrite_links(page, markup).unwrap(),
            r#"<img src="../../a.png" data-src="/b.png"><div href="/c/">"#
        );
    }

    #[test]
    fn test_clean_page_rewrites_injected_stylesheet() {
        let out = clean_page("http://h/pkg/io/", "<html><head></head></html>").unwrap();
        assert!(out.contains(r#"<link rel="stylesheet" href="../../custom.css">"#));
    }
}
