//! Mapping between the site's URL space and the offline file layout.
//!
//! Every function here is pure: the same URL is resolved from many places
//! during a run (outline, index, link rewriting, downloads) and all of them
//! must agree on the resulting path.

use crate::error::{MirrorError, Result};
use percent_encoding::percent_decode_str;
use url::Url;

/// Filename appended to directory-style paths.
pub const INDEX_FILE: &str = "index.html";

fn parse(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| MirrorError::path(url, e))
}

fn join(base: &Url, href: &str) -> Result<Url> {
    base.join(href).map_err(|e| MirrorError::path(href, e))
}

/// Split a reference into its path and its `?query#fragment` tail.
fn split_tail(url: &str) -> (&str, &str) {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url.split_at(end)
}

/// Resolve `href` against `base` (relative, absolute, fragment and
/// protocol-relative references).
pub fn absolute_url(base: &str, href: &str) -> Result<String> {
    let base = parse(base)?;
    Ok(join(&base, href)?.to_string())
}

/// Append `index.html` when the path component ends with `/`.
pub fn with_index_suffix(url: &str) -> String {
    let (path, tail) = split_tail(url);
    if path.ends_with('/') {
        format!("{path}{INDEX_FILE}{tail}")
    } else {
        url.to_owned()
    }
}

/// Whether two URLs point at the same host (and explicit port).
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}

/// Convert a link found on `base` into an outline/index target.
///
/// Links to another host are returned as resolved absolute URLs. Links on
/// the same host become site-root-relative paths without the leading `/`.
pub fn absolute_path(base: &str, href: &str) -> Result<String> {
    let base = parse(base)?;
    let resolved = join(&base, href)?;

    if !same_host(&base, &resolved) {
        return Ok(resolved.to_string());
    }

    let mut local = resolved.path().to_owned();
    if let Some(query) = resolved.query() {
        local.push('?');
        local.push_str(query);
    }
    if let Some(fragment) = resolved.fragment() {
        local.push('#');
        local.push_str(fragment);
    }

    Ok(site_path(&local))
}

/// Normalize a site-root-relative target (`/a/`) into its offline form (`a/index.html`).
pub fn site_path(target: &str) -> String {
    let target = with_index_suffix(target);
    match target.strip_prefix('/') {
        Some(stripped) => stripped.to_owned(),
        None => target,
    }
}

/// Rewrite `resource` as it appears inside the page at `base`.
///
/// Root-relative resources become relative to the page's directory so the
/// mirrored tree can be moved anywhere; everything else only gets the
/// directory suffix.
pub fn relative_path(base: &str, resource: &str) -> Result<String> {
    if is_root_relative(resource) {
        let base = parse(base)?;
        Ok(rebase(base.path(), resource))
    } else {
        Ok(with_index_suffix(resource))
    }
}

/// `/x` but not `//host/x`.
pub fn is_root_relative(resource: &str) -> bool {
    resource.starts_with('/') && !resource.starts_with("//")
}

/// Express the root-relative `resource` relative to the directory of `base_path`.
pub(crate) fn rebase(base_path: &str, resource: &str) -> String {
    let (path, tail) = split_tail(resource);

    let base_dir = match base_path.rfind('/') {
        Some(pos) => &base_path[..=pos],
        None => "/",
    };
    let from: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend_from_slice(&to[common..]);

    let mut relative = parts.join("/");
    if relative.is_empty() {
        relative.push('.');
    }
    if path.ends_with('/') {
        relative.push('/');
    }
    relative.push_str(tail);

    with_index_suffix(&relative.replace('\\', "/"))
}

/// Local file path (relative to the output directory) for a page or asset URL.
pub fn local_filename(url: &str) -> Result<String> {
    let parsed = parse(url)?;
    let mut path = percent_decode_str(parsed.path())
        .decode_utf8_lossy()
        .into_owned();
    if path.ends_with('/') {
        path.push_str(INDEX_FILE);
    }
    Ok(match path.strip_prefix('/') {
        Some(stripped) => stripped.to_owned(),
        None => path,
    })
}

/// Point a site root URL at its package listing (`.../pkg/`).
pub fn listing_url(root: &str) -> String {
    if root.ends_with("/pkg/") {
        root.to_owned()
    } else if root.ends_with("/pkg") {
        format!("{root}/")
    } else {
        format!("{}/pkg/", root.trim_end_matches('/'))
    }
}
