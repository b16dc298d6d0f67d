//! Rebuilding a tree from a flat, indented listing.
//!
//! Documentation pages render nested lists as flat rows with visual
//! indentation. [`LevelTreeBuilder`] turns a stream of (label, target, level)
//! rows, read in document order, back into outline nodes. A deeper row nests
//! under the row before it, a shallower row climbs one parent per level and
//! an equal row becomes a sibling. Climbing past the starting node is an
//! error.

use crate::error::{Result, StructureError};
use crate::paths::site_path;
use crate::tree::{NodeId, OutlineTree};

/// One row of an indented listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRecord {
    pub label: String,
    /// Site-root-relative target, e.g. `/pkg/io/`.
    pub target: Option<String>,
    pub level: usize,
}

impl LevelRecord {
    pub fn new(label: impl Into<String>, target: Option<&str>, level: usize) -> Self {
        Self {
            label: label.into(),
            target: target.map(str::to_owned),
            level,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Previous {
    Start,
    Node(NodeId),
    Skipped,
}

/// Cursor that walks an [`OutlineTree`] up and down as row levels change.
///
/// A deeper row moves the cursor onto the previous row, whatever the size of
/// the jump. A shallower row walks the cursor up one parent per level.
#[derive(Debug, Clone)]
pub struct LevelTreeBuilder {
    root: NodeId,
    current: NodeId,
    previous_level: usize,
    previous: Previous,
    /// Steps taken below `current` into rows that were skipped.
    detached: usize,
    /// Kept rows entered from inside a skipped subtree, with the detached
    /// depth to restore when the cursor climbs back out of them.
    resumes: Vec<(NodeId, usize)>,
}

impl LevelTreeBuilder {
    /// Start building under `root`, whose rows are at level 0.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            current: root,
            previous_level: 0,
            previous: Previous::Start,
            detached: 0,
            resumes: Vec::new(),
        }
    }

    /// Move the cursor for a row at `level` and return its parent node.
    pub fn enter(
        &mut self,
        tree: &OutlineTree,
        label: &str,
        level: usize,
    ) -> std::result::Result<NodeId, StructureError> {
        if level > self.previous_level {
            match self.previous {
                Previous::Node(id) => {
                    if self.detached > 0 {
                        self.resumes.push((id, self.detached));
                        self.detached = 0;
                    }
                    self.current = id;
                }
                Previous::Skipped => self.detached += 1,
                Previous::Start => {
                    return Err(StructureError::NoParent {
                        label: label.to_owned(),
                        level,
                    });
                }
            }
        } else {
            for _ in level..self.previous_level {
                self.climb(tree, label, level)?;
            }
        }

        self.previous_level = level;
        Ok(self.current)
    }

    fn climb(
        &mut self,
        tree: &OutlineTree,
        label: &str,
        level: usize,
    ) -> std::result::Result<(), StructureError> {
        if self.detached > 0 {
            self.detached -= 1;
            return Ok(());
        }
        if let Some(&(node, detached)) = self.resumes.last() {
            if node == self.current {
                self.resumes.pop();
                self.detached = detached;
            }
        }

        let above_root = || StructureError::AboveRoot {
            label: label.to_owned(),
            level,
        };
        if self.current == self.root {
            return Err(above_root());
        }
        self.current = tree.parent(self.current).ok_or_else(above_root)?;
        Ok(())
    }

    /// Insert a row under the cursor (add-or-get by label and target).
    pub fn insert(&mut self, tree: &mut OutlineTree, label: &str, target: Option<&str>) -> NodeId {
        let id = tree.add_child(self.current, label, target);
        self.previous = Previous::Node(id);
        id
    }

    /// Position for `level` and insert the row.
    pub fn push(
        &mut self,
        tree: &mut OutlineTree,
        label: &str,
        target: Option<&str>,
        level: usize,
    ) -> Result<NodeId> {
        self.enter(tree, label, level)?;
        Ok(self.insert(tree, label, target))
    }

    /// Account for a row that is left out of the tree.
    ///
    /// Deeper rows that follow a skipped row nest under the skipped row's parent.
    pub fn skip(&mut self, tree: &OutlineTree, label: &str, level: usize) -> Result<()> {
        self.enter(tree, label, level)?;
        self.previous = Previous::Skipped;
        Ok(())
    }
}

/// Build rows under `root`, normalizing targets with [`site_path`].
pub fn build_level_tree(
    tree: &mut OutlineTree,
    root: NodeId,
    records: &[LevelRecord],
) -> Result<Vec<NodeId>> {
    let mut builder = LevelTreeBuilder::new(root);
    records
        .iter()
        .map(|r| {
            let target = r.target.as_deref().map(site_path);
            builder.push(tree, &r.label, target.as_deref(), r.level)
        })
        .collect()
}
