//! Help project manifest (`.hhp`) and the trees it owns.

use crate::error::Result;
use crate::index::IndexTree;
use crate::keyword::{cmp_ignore_case, IndexOrder};
use crate::sitemap::{self, TextBuffer};
use crate::tree::OutlineTree;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

/// Positional parameters of the `[WINDOWS]` definition.
const WINDOW_KEYS: [&str; 20] = [
    "title",
    "contents_file",
    "index_file",
    "default_topic",
    "home",
    "jump1",
    "jump1_text",
    "jump2",
    "jump2_text",
    "navigation_pane_styles",
    "navigation_pane_width",
    "buttons",
    "initial_position",
    "style_flags",
    "extended_style_flags",
    "window_show_state",
    "navigation_pane_closed",
    "default_navigation_pane",
    "navigation_pane_position",
    "id",
];

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+|0[xX][0-9a-fA-F]+)$").unwrap());

fn backslashed(path: &str) -> String {
    path.replace('/', "\\")
}

/// A help project: compiler options, the default window, referenced files,
/// the outline and the keyword index.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    options: BTreeMap<String, String>,
    window: HashMap<String, String>,
    files: Vec<String>,
    outline: OutlineTree,
    index: IndexTree,
    index_order: IndexOrder,
}

impl Project {
    /// Create a project with the default options for `name`.
    pub fn new(name: &str) -> Self {
        let options = [
            ("Compatibility", "1.1 or later".to_owned()),
            ("Compiled File", format!("{name}.chm")),
            ("Display Compile Progress", "No".to_owned()),
            ("Language", "0x409 English (United States)".to_owned()),
            ("Default Window", "main".to_owned()),
            ("Contents File", format!("{name}.hhc")),
            ("Index File", format!("{name}.hhk")),
            // multi-topic keywords are not shown with a binary index
            ("Binary Index", "No".to_owned()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

        let window = [
            ("title", name.to_owned()),
            ("id", "0".to_owned()),
            ("navigation_pane_styles", "0x12120".to_owned()),
            ("buttons", "0x10184e".to_owned()),
            ("contents_file", format!("{name}.hhc")),
            ("index_file", format!("{name}.hhk")),
            ("default_topic", "index.html".to_owned()),
            ("home", "index.html".to_owned()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

        let mut outline = OutlineTree::new();
        outline.set_property("Window Styles", "0x801627");
        outline.set_property("Font", "Tahoma,8,0");

        let mut index = IndexTree::new();
        index.set_property("Font", "Tahoma,8,0");

        Self {
            name: name.to_owned(),
            options,
            window,
            files: Vec::with_capacity(100),
            outline,
            index,
            index_order: IndexOrder::default(),
        }
    }

    pub fn with_index_order(mut self, order: IndexOrder) -> Self {
        self.index_order = order;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outline(&self) -> &OutlineTree {
        &self.outline
    }

    pub fn outline_mut(&mut self) -> &mut OutlineTree {
        &mut self.outline
    }

    pub fn index(&self) -> &IndexTree {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut IndexTree {
        &mut self.index
    }

    /// Split borrow of both trees.
    pub fn trees_mut(&mut self) -> (&mut OutlineTree, &mut IndexTree) {
        (&mut self.outline, &mut self.index)
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn window_option(&self, key: &str) -> Option<&str> {
        self.window.get(key).map(String::as_str)
    }

    pub fn set_window_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.window.insert(key.into(), value.into());
    }

    pub fn compiled_file(&self) -> Option<&str> {
        self.option("Compiled File")
    }

    pub fn set_compiled_file(&mut self, path: &str) {
        self.set_option("Compiled File", path);
    }

    /// Set the page shown when the help file opens.
    pub fn set_start_file(&mut self, file: &str) {
        let file = backslashed(file);
        self.window.insert("default_topic".to_owned(), file.clone());
        self.window.insert("home".to_owned(), file.clone());
        self.files.push(file);
    }

    /// Record a file referenced by the project.
    pub fn add_file(&mut self, file: &str) {
        self.files.push(backslashed(file));
    }

    /// Referenced files, duplicates removed ignoring case, sorted ignoring case.
    pub fn files(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut files: Vec<&str> = self
            .files
            .iter()
            .filter(|f| seen.insert(f.to_lowercase()))
            .map(String::as_str)
            .collect();
        files.sort_by(|a, b| cmp_ignore_case(a, b));
        files
    }

    /// The `main=` window definition.
    pub fn window_line(&self) -> String {
        WINDOW_KEYS
            .iter()
            .map(|key| {
                let value = self.window_option(key).unwrap_or("");
                if value.is_empty() || NUMERIC.is_match(value) {
                    value.to_owned()
                } else {
                    format!("\"{value}\"")
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Render the `.hhp` manifest.
    pub fn render_manifest(&self) -> String {
        let mut out = TextBuffer::new();

        out.line("[OPTIONS]");
        for (key, value) in self.options.iter().filter(|(_, v)| !v.is_empty()) {
            out.line(format!("{key}={value}"));
        }
        out.blank();

        out.line("[WINDOWS]");
        out.line(format!("main={}", self.window_line()));
        out.blank();

        let files = self.files();
        if !files.is_empty() {
            out.line("[FILES]");
            for file in files {
                out.line(file);
            }
            out.blank();
        }

        out.line("[INFOTYPES]");
        out.blank();

        out.into_string()
    }

    /// Render the `.hhc` contents file.
    pub fn render_outline(&self) -> String {
        sitemap::render_outline(&self.outline)
    }

    /// Render the `.hhk` index file.
    pub fn render_index(&self) -> Result<String> {
        sitemap::render_index(&self.index, self.index_order)
    }

    pub fn manifest_filename(&self) -> String {
        format!("{}.hhp", self.name)
    }

    pub fn outline_filename(&self) -> String {
        format!("{}.hhc", self.name)
    }

    pub fn index_filename(&self) -> String {
        format!("{}.hhk", self.name)
    }
}
