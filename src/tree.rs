//! Outline (table of contents) tree.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]; each node
//! stores the id of its parent instead of a reference, so the tree can be
//! walked upwards while it is being built.

use crate::keyword::cmp_ignore_case;
use std::collections::BTreeMap;

/// Stable handle to a node in an [`OutlineTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Icon shown next to an outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Icon {
    #[default]
    None,
    Directory,
    File,
    Function,
    Method,
    Field,
    Type,
}

impl Icon {
    /// Image index in the help viewer's built-in icon strip.
    pub fn image_number(self) -> Option<u32> {
        match self {
            Icon::None => None,
            Icon::Directory => Some(5),
            Icon::File => Some(11),
            Icon::Function => Some(17),
            Icon::Method => Some(19),
            Icon::Field => Some(35),
            Icon::Type => Some(37),
        }
    }
}

/// A node in the outline.
#[derive(Debug, Clone)]
pub struct OutlineNode {
    /// Displayed label.
    pub label: String,
    /// Relative path of the page this entry opens.
    pub target: Option<String>,
    /// Children in display order.
    pub children: Vec<NodeId>,
    /// Parent node; `None` only for the root.
    pub parent: Option<NodeId>,
    pub icon: Icon,
}

impl OutlineNode {
    fn new(label: String, target: Option<String>, parent: Option<NodeId>) -> Self {
        Self {
            label,
            target,
            children: Vec::new(),
            parent,
            icon: Icon::None,
        }
    }

    /// Check if this node has children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// The outline tree with its site properties.
#[derive(Debug, Clone)]
pub struct OutlineTree {
    properties: BTreeMap<String, String>,
    nodes: Vec<OutlineNode>,
}

impl Default for OutlineTree {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineTree {
    /// Create a tree holding only the root sentinel.
    pub fn new() -> Self {
        Self {
            properties: BTreeMap::new(),
            nodes: vec![OutlineNode::new(String::new(), None, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &OutlineNode {
        &self.nodes[id.0]
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.0].label
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Add a child under `parent`, or return the existing child with the
    /// same label and target.
    pub fn add_child(&mut self, parent: NodeId, label: &str, target: Option<&str>) -> NodeId {
        let label = label.trim();
        let target = target.map(str::trim).filter(|t| !t.is_empty());

        let existing = self.nodes[parent.0].children.iter().copied().find(|c| {
            let node = &self.nodes[c.0];
            node.label == label && node.target.as_deref() == target
        });
        if let Some(id) = existing {
            return id;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(OutlineNode::new(
            label.to_owned(),
            target.map(str::to_owned),
            Some(parent),
        ));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Set the icon of a node.
    pub fn tag(&mut self, id: NodeId, icon: Icon) {
        self.nodes[id.0].icon = icon;
    }

    /// Sort the direct children of `id` by label, ignoring case.
    pub fn sort_children(&mut self, id: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        children.sort_by(|a, b| cmp_ignore_case(&self.nodes[a.0].label, &self.nodes[b.0].label));
        self.nodes[id.0].children = children;
    }

    /// Depth of a node below the root (the root is at level 0).
    pub fn level(&self, id: NodeId) -> usize {
        let mut level = 0;
        let mut current = self.parent(id);
        while let Some(p) = current {
            level += 1;
            current = self.parent(p);
        }
        level
    }

    /// Number of nodes, not counting the root sentinel.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Length of the longest root-to-leaf path, not counting the root.
    pub fn max_depth(&self) -> usize {
        fn depth(tree: &OutlineTree, id: NodeId) -> usize {
            tree.children(id)
                .iter()
                .map(|c| 1 + depth(tree, *c))
                .max()
                .unwrap_or(0)
        }
        depth(self, self.root())
    }

    /// Find the child of `parent` with the given label.
    pub fn child_by_label(&self, parent: NodeId, label: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.label(*c) == label)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
