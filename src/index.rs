//! Keyword index tree.
//!
//! Children of a keyword are shown indented under it; a keyword with more
//! than one local is shown as a popup listing every target.

use crate::error::Result;
use crate::keyword::{classify, cmp_ignore_case, compare_entries, IndexOrder};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Stable handle to an entry in an [`IndexTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// A single jump destination of a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local {
    pub target: String,
    pub title: String,
}

/// Order of locals inside one keyword: untitled first (by target), then by title.
pub fn compare_locals(a: &Local, b: &Local) -> Ordering {
    match (a.title.is_empty(), b.title.is_empty()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => cmp_ignore_case(&a.title, &b.title),
        (true, true) => cmp_ignore_case(&a.target, &b.target),
    }
}

/// A keyword in the index.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub keyword: String,
    pub locals: Vec<Local>,
    pub children: Vec<EntryId>,
    pub parent: Option<EntryId>,
    lookup: HashMap<String, EntryId>,
}

impl IndexEntry {
    fn new(keyword: String, parent: Option<EntryId>) -> Self {
        Self {
            keyword,
            locals: Vec::with_capacity(1),
            children: Vec::new(),
            parent,
            lookup: HashMap::new(),
        }
    }

    /// Locals in display order.
    pub fn sorted_locals(&self) -> Vec<&Local> {
        let mut locals: Vec<&Local> = self.locals.iter().collect();
        locals.sort_by(|a, b| compare_locals(a, b));
        locals
    }
}

/// The keyword index with its site properties.
#[derive(Debug, Clone)]
pub struct IndexTree {
    properties: BTreeMap<String, String>,
    entries: Vec<IndexEntry>,
}

impl Default for IndexTree {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexTree {
    pub fn new() -> Self {
        Self {
            properties: BTreeMap::new(),
            entries: vec![IndexEntry::new(String::new(), None)],
        }
    }

    pub fn root(&self) -> EntryId {
        EntryId(0)
    }

    pub fn entry(&self, id: EntryId) -> &IndexEntry {
        &self.entries[id.0]
    }

    /// Add a sub-keyword under `parent`, or return the existing one.
    pub fn add(&mut self, parent: EntryId, keyword: &str) -> EntryId {
        if let Some(id) = self.entries[parent.0].lookup.get(keyword) {
            return *id;
        }
        let id = EntryId(self.entries.len());
        self.entries
            .push(IndexEntry::new(keyword.to_owned(), Some(parent)));
        let parent_entry = &mut self.entries[parent.0];
        parent_entry.lookup.insert(keyword.to_owned(), id);
        parent_entry.children.push(id);
        id
    }

    /// Attach a jump target to a keyword; identical (target, title) pairs are stored once.
    pub fn add_local(&mut self, id: EntryId, target: &str, title: &str) {
        let local = Local {
            target: target.trim().to_owned(),
            title: title.trim().to_owned(),
        };
        let locals = &mut self.entries[id.0].locals;
        if !locals.contains(&local) {
            locals.push(local);
        }
    }

    /// Add a top-level keyword with one local.
    pub fn add_keyword(&mut self, keyword: &str, target: &str, title: &str) -> EntryId {
        let root = self.root();
        let id = self.add(root, keyword);
        self.add_local(id, target, title);
        id
    }

    /// Children of `id` in display order.
    pub fn sorted_children(&self, id: EntryId, order: IndexOrder) -> Result<Vec<EntryId>> {
        let children = &self.entries[id.0].children;
        match order {
            IndexOrder::Composite => {
                let mut keyed = children
                    .iter()
                    .map(|c| Ok((classify(&self.entries[c.0].keyword)?, *c)))
                    .collect::<Result<Vec<_>>>()?;
                keyed.sort_by(|(a, _), (b, _)| compare_entries(a, b));
                Ok(keyed.into_iter().map(|(_, c)| c).collect())
            }
            IndexOrder::Keyword => {
                let mut sorted = children.clone();
                sorted.sort_by(|a, b| {
                    let (a, b) = (&self.entries[a.0].keyword, &self.entries[b.0].keyword);
                    cmp_ignore_case(a, b).then_with(|| a.cmp(b))
                });
                Ok(sorted)
            }
        }
    }

    /// Number of keywords, not counting the root sentinel.
    pub fn keyword_count(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
