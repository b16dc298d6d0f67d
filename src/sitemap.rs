//! Sitemap markup for the outline (`.hhc`) and index (`.hhk`) files.

use crate::error::Result;
use crate::index::{EntryId, IndexTree};
use crate::keyword::IndexOrder;
use crate::tree::{NodeId, OutlineTree};
use std::collections::BTreeMap;

const LINE_END: &str = "\r\n";

/// Line-oriented text builder with a tab indent stack.
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: String,
    depth: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one indented line.
    pub fn line(&mut self, content: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.text.push('\t');
        }
        self.text.push_str(content.as_ref());
        self.text.push_str(LINE_END);
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.text.push_str(LINE_END);
    }

    /// Write `header` and indent what follows.
    pub fn open(&mut self, header: impl AsRef<str>) {
        self.line(header);
        self.depth += 1;
    }

    /// Unindent and write `trailer`.
    pub fn close(&mut self, trailer: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(trailer);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Escape a value for use inside a double-quoted attribute.
fn attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

fn param(out: &mut TextBuffer, name: &str, value: &str) {
    out.line(format!(r#"<param name="{name}" value="{}">"#, attr(value)));
}

fn write_header(out: &mut TextBuffer, properties: &BTreeMap<String, String>) {
    out.line(r#"<!DOCTYPE HTML PUBLIC "-//IETF//DTD HTML//EN">"#);
    out.line("<HTML>");
    out.line("<HEAD>");
    out.line(r#"<meta name="GENERATOR" content="Microsoft&reg; HTML Help Workshop 4.1">"#);
    out.line("<!-- Sitemap 1.0 -->");
    out.line("</HEAD><BODY>");

    if !properties.is_empty() {
        out.open(r#"<OBJECT type="text/site properties">"#);
        for (key, value) in properties.iter().filter(|(_, v)| !v.is_empty()) {
            param(out, key, value);
        }
        out.close("</OBJECT>");
    }
}

fn write_footer(out: &mut TextBuffer) {
    out.line("</BODY></HTML>");
}

/// Render the outline as a contents file.
pub fn render_outline(tree: &OutlineTree) -> String {
    let mut out = TextBuffer::new();
    write_header(&mut out, tree.properties());
    write_outline_node(&mut out, tree, tree.root());
    write_footer(&mut out);
    out.into_string()
}

fn write_outline_node(out: &mut TextBuffer, tree: &OutlineTree, id: NodeId) {
    let node = tree.node(id);
    if !node.is_root() {
        out.open(r#"<LI> <OBJECT type="text/sitemap">"#);
        param(out, "Name", &node.label);
        if let Some(target) = &node.target {
            param(out, "Local", target);
        }
        match node.icon.image_number() {
            Some(image) => param(out, "ImageNumber", &image.to_string()),
            // entries without a page show as folders
            None if node.target.is_none() => param(out, "ImageNumber", "5"),
            None => {}
        }
        out.close("</OBJECT>");
    }

    if node.has_children() {
        out.open("<UL>");
        for child in &node.children {
            write_outline_node(out, tree, *child);
        }
        out.close("</UL>");
    }
}

/// Render the keyword index as an index file, children sorted by `order`.
pub fn render_index(index: &IndexTree, order: IndexOrder) -> Result<String> {
    let mut out = TextBuffer::new();
    write_header(&mut out, index.properties());
    write_index_entry(&mut out, index, index.root(), order)?;
    write_footer(&mut out);
    Ok(out.into_string())
}

fn write_index_entry(
    out: &mut TextBuffer,
    index: &IndexTree,
    id: EntryId,
    order: IndexOrder,
) -> Result<()> {
    let entry = index.entry(id);
    if entry.parent.is_some() {
        out.open(r#"<LI> <OBJECT type="text/sitemap">"#);
        param(out, "Name", entry.keyword.trim());
        for local in entry.sorted_locals() {
            if !local.title.is_empty() {
                param(out, "Name", &local.title);
            }
            param(out, "Local", &local.target);
        }
        out.close("</OBJECT>");
    }

    if !entry.children.is_empty() {
        out.open("<UL>");
        for child in index.sorted_children(id, order)? {
            write_index_entry(out, index, child, order)?;
        }
        out.close("</UL>");
    }
    Ok(())
}
