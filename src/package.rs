//! Outline and index entries for a single package page.
//!
//! A package page carries a navigation index (`#manual-nav`) listing its
//! constants, variables, functions, types and methods, followed by the
//! declarations themselves and the "Examples" and "Package files" sections.

use crate::document::{
    clean_title, following_elements, next_element, select_within, text_of, HtmlDocument,
};
use crate::error::{MirrorError, Result};
use crate::index::IndexTree;
use crate::keyword::EntryKind;
use crate::level::LevelTreeBuilder;
use crate::listing::nav_rows;
use crate::paths::{absolute_path, absolute_url};
use crate::tree::{Icon, NodeId, OutlineTree};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static FUNC_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?-u:\w)+").unwrap());

/// What a navigation row declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavKind {
    Type,
    Function,
    Method,
    Section,
}

/// Split a navigation label into its kind and the text shown in the outline.
fn nav_entry(label: &str) -> (NavKind, &str) {
    if let Some(name) = label.strip_prefix("type ") {
        return (NavKind::Type, name);
    }
    match label.strip_prefix("func ") {
        Some(sig) if sig.starts_with('(') => {
            // drop the receiver
            let rest = sig.find(')').map_or(sig, |end| &sig[end + 1..]);
            (NavKind::Method, rest.trim())
        }
        Some(sig) => (NavKind::Function, sig),
        None => (NavKind::Section, label),
    }
}

/// `Name(args) result` becomes `Name()`.
fn simplify_func(signature: &str) -> Result<String> {
    FUNC_NAME
        .find(signature)
        .map(|m| format!("{}()", m.as_str()))
        .ok_or_else(|| MirrorError::Format(format!("no function name in '{signature}'")))
}

/// What indexing a package page found.
#[derive(Debug, Clone, Default)]
pub struct PackageReport {
    /// Cleaned `<title>` of the page.
    pub title: String,
    /// The page lists sub-directories instead of documenting a package.
    pub is_directory: bool,
    /// Absolute URLs of the package's source files.
    pub source_files: Vec<String>,
    /// Index keywords added for the package's symbols.
    pub keywords: usize,
}

/// Populates the outline and index from one package page.
pub struct PackageIndexer<'a> {
    doc: &'a HtmlDocument,
    url: &'a str,
    package: &'a str,
}

impl<'a> PackageIndexer<'a> {
    /// `url` is the page's address, `package` its full import path.
    pub fn new(doc: &'a HtmlDocument, url: &'a str, package: &'a str) -> Self {
        Self { doc, url, package }
    }

    /// Add the page's symbols under `node` and its keywords to `index`.
    pub fn index(
        &self,
        outline: &mut OutlineTree,
        index: &mut IndexTree,
        node: NodeId,
    ) -> Result<PackageReport> {
        let mut report = PackageReport {
            title: self.doc.title()?,
            is_directory: self.doc.is_directory()?,
            ..Default::default()
        };
        if report.is_directory {
            debug!(url = self.url, "directory page, no symbols");
            return Ok(report);
        }

        report.keywords = self.index_navigation(outline, index, node)?;
        report.source_files = self.index_sections(outline, node)?;
        Ok(report)
    }

    fn target(&self, href: &str) -> Result<String> {
        absolute_path(self.url, href)
    }

    fn add_keyword(&self, index: &mut IndexTree, keyword: String, target: &str) {
        index.add_keyword(&keyword, target, self.package);
    }

    fn index_navigation(
        &self,
        outline: &mut OutlineTree,
        index: &mut IndexTree,
        node: NodeId,
    ) -> Result<usize> {
        let keywords_before = index.keyword_count();
        let mut builder = LevelTreeBuilder::new(node);

        for row in nav_rows(self.doc)? {
            let parent = builder.enter(outline, &row.label, row.level)?;
            let target = self.target(&row.href)?;
            let (kind, text) = nav_entry(&row.label);
            let pkg = self.package;

            let icon = match kind {
                NavKind::Type => {
                    self.add_keyword(index, format!("{text} (type in {pkg})"), &target);
                    Icon::Type
                }
                NavKind::Method => {
                    if !text.starts_with("String() string") {
                        let keyword = format!(
                            "{} (method of {} in {pkg})",
                            simplify_func(text)?,
                            outline.label(parent)
                        );
                        self.add_keyword(index, keyword, &target);
                    }
                    Icon::Method
                }
                NavKind::Function => {
                    let keyword = format!("{} (func in {pkg})", simplify_func(text)?);
                    self.add_keyword(index, keyword, &target);
                    Icon::Function
                }
                NavKind::Section => Icon::None,
            };

            let id = builder.insert(outline, text, Some(&target));
            outline.tag(id, icon);

            match (kind, text) {
                (NavKind::Type, name) => self.add_fields(outline, id, name)?,
                (NavKind::Section, "Constants") => {
                    self.add_declarations(outline, index, id, "pkg-constants", EntryKind::Const)?
                }
                (NavKind::Section, "Variables") => {
                    self.add_declarations(outline, index, id, "pkg-variables", EntryKind::Var)?
                }
                _ => {}
            }
        }

        Ok(index.keyword_count() - keywords_before)
    }

    /// Struct fields declared after `h2#TYPE` go under a `Fields` child.
    fn add_fields(&self, outline: &mut OutlineTree, type_node: NodeId, name: &str) -> Result<()> {
        let Some(decl) = self
            .doc
            .element_by_id("h2", name)?
            .and_then(next_element)
        else {
            return Ok(());
        };

        let mut fields = None;
        let mut pending_id: Option<String> = None;
        for child in decl.children() {
            if let Some(text) = child.value().as_text() {
                let Some(id) = pending_id.take() else {
                    continue;
                };
                // the declaration continues past the field's own line
                let label = clean_title(text.lines().next().unwrap_or_default());
                if label.is_empty() {
                    continue;
                }
                let fields =
                    *fields.get_or_insert_with(|| outline.add_child(type_node, "Fields", None));
                let target = self.target(&format!("#{id}"))?;
                let field = outline.add_child(fields, &label, Some(&target));
                outline.tag(field, Icon::Field);
            } else if let Some(element) = child.value().as_element() {
                if element.name() == "span" {
                    pending_id = element
                        .attr("id")
                        .filter(|id| !id.is_empty())
                        .map(str::to_owned);
                }
            }
        }
        Ok(())
    }

    /// Named constants or variables between `#anchor` and the next `h2`.
    fn add_declarations(
        &self,
        outline: &mut OutlineTree,
        index: &mut IndexTree,
        node: NodeId,
        anchor: &str,
        kind: EntryKind,
    ) -> Result<()> {
        let Some(heading) = self.doc.select_first(&format!("#{anchor}"))? else {
            return Ok(());
        };

        for block in following_elements(heading).take_while(|e| e.value().name() != "h2") {
            for span in select_within(block, "span[id]")? {
                let Some(id) = span.value().attr("id") else {
                    continue;
                };
                let name = clean_title(&text_of(span));
                // bare anchors carry no name
                if name.is_empty() {
                    continue;
                }
                let target = self.target(&format!("#{id}"))?;
                outline.add_child(node, &name, Some(&target));
                self.add_keyword(index, format!("{name} ({kind} in {})", self.package), &target);
            }
        }
        Ok(())
    }

    /// `Examples` and `Package files` sections; returns the source file URLs.
    fn index_sections(&self, outline: &mut OutlineTree, node: NodeId) -> Result<Vec<String>> {
        let mut source_files = Vec::new();

        for h3 in self.doc.select("h3")? {
            let (label, is_files) = match text_of(h3).trim() {
                "Examples" => ("Examples", false),
                "Package files" => ("Files", true),
                _ => continue,
            };
            let section = outline.add_child(node, label, None);
            let Some(list) = next_element(h3) else {
                continue;
            };

            for link in select_within(list, "a")? {
                let href = link.value().attr("href").unwrap_or_default();
                let target = self.target(href)?;
                let entry = outline.add_child(section, &clean_title(&text_of(link)), Some(&target));
                if is_files {
                    outline.tag(entry, Icon::File);
                    source_files.push(absolute_url(self.url, href)?);
                }
            }
        }
        Ok(source_files)
    }
}
